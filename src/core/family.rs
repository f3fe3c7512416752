//! Family business logic - sharing groups, membership, and invitations.
//!
//! A user belongs to at most one family. Owners and admins may invite people by
//! email; the invitation is a single-use token with an expiry.

use crate::{
    core::email::{EmailDispatcher, EmailMessage, EmailTemplate},
    entities::{
        Family, FamilyInvitation, FamilyMember, FamilyRole, family, family_invitation,
        family_member,
    },
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Days an invitation stays valid unless configured otherwise.
pub const DEFAULT_INVITATION_TTL_DAYS: i64 = 7;

/// Result of sending an invitation.
#[derive(Debug, Clone)]
pub struct InvitationOutcome {
    /// The stored invitation
    pub invitation: family_invitation::Model,
    /// Link to hand to the invitee
    pub invitation_url: String,
    /// Set when the row was created but the email could not be sent
    pub dispatch_warning: Option<String>,
}

/// Returns the user's membership, if any.
pub async fn get_membership<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<Option<family_member::Model>> {
    FamilyMember::find()
        .filter(family_member::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user's family together with their membership.
pub async fn get_family_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<(family::Model, family_member::Model)> {
    let membership = get_membership(db, user_id)
        .await?
        .ok_or_else(|| Error::FamilyNotFound {
            user_id: user_id.to_string(),
        })?;
    let family = Family::find_by_id(membership.family_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::FamilyNotFound {
            user_id: user_id.to_string(),
        })?;
    Ok((family, membership))
}

/// Creates a family with `user_id` as its owner.
#[instrument(skip(db))]
pub async fn create_family(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<family::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Family name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;
    if get_membership(&txn, user_id).await?.is_some() {
        return Err(Error::AlreadyInFamily {
            user_id: user_id.to_string(),
        });
    }

    let now = Utc::now();
    let family = family::ActiveModel {
        name: Set(name.to_string()),
        created_by: Set(user_id.to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_member(&txn, family.id, user_id, FamilyRole::Owner).await?;
    txn.commit().await?;

    info!("User {} created family '{}'", user_id, family.name);
    Ok(family)
}

async fn insert_member<C: ConnectionTrait>(
    db: &C,
    family_id: i64,
    user_id: &str,
    role: FamilyRole,
) -> Result<family_member::Model> {
    family_member::ActiveModel {
        family_id: Set(family_id),
        user_id: Set(user_id.to_string()),
        role: Set(role),
        joined_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Adds a user to a family directly, bypassing invitations.
pub async fn add_member(
    db: &DatabaseConnection,
    family_id: i64,
    user_id: &str,
    role: FamilyRole,
) -> Result<family_member::Model> {
    if get_membership(db, user_id).await?.is_some() {
        return Err(Error::AlreadyInFamily {
            user_id: user_id.to_string(),
        });
    }
    insert_member(db, family_id, user_id, role).await
}

/// Members of the user's family, owner first then by join time.
pub async fn list_members(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<family_member::Model>> {
    let (family, _) = get_family_for_user(db, user_id).await?;
    let mut members = FamilyMember::find()
        .filter(family_member::Column::FamilyId.eq(family.id))
        .order_by_asc(family_member::Column::JoinedAt)
        .all(db)
        .await?;
    members.sort_by_key(|m| m.role != FamilyRole::Owner);
    Ok(members)
}

/// Invitations of the user's family that can still be redeemed.
pub async fn list_pending_invitations(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<family_invitation::Model>> {
    let (family, membership) = get_family_for_user(db, user_id).await?;
    if !membership.role.can_invite() {
        return Err(Error::NotFamilyManager {
            user_id: user_id.to_string(),
        });
    }
    FamilyInvitation::find()
        .filter(family_invitation::Column::FamilyId.eq(family.id))
        .filter(family_invitation::Column::UsedAt.is_null())
        .filter(family_invitation::Column::ExpiresAt.gt(Utc::now()))
        .order_by_desc(family_invitation::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates an invitation for `email` and asks the dispatcher to send it.
///
/// The invitation row is stored first. A dispatch failure does not undo it; it is
/// logged and reported through [`InvitationOutcome::dispatch_warning`].
#[instrument(skip(db, dispatcher))]
pub async fn invite_member<D: EmailDispatcher + Sync>(
    db: &DatabaseConnection,
    dispatcher: &D,
    user_id: &str,
    email: &str,
    ttl_days: i64,
    base_url: &str,
) -> Result<InvitationOutcome> {
    if ttl_days <= 0 {
        return Err(Error::Validation {
            message: "Invitation lifetime must be at least one day".to_string(),
        });
    }
    let (family, membership) = get_family_for_user(db, user_id).await?;
    if !membership.role.can_invite() {
        return Err(Error::NotFamilyManager {
            user_id: user_id.to_string(),
        });
    }

    let token = uuid::Uuid::new_v4().to_string();
    let invitation_url = format!("{}/join-family?token={token}", base_url.trim_end_matches('/'));
    let message = EmailMessage::new(
        email,
        EmailTemplate::FamilyInvitation {
            family_name: family.name.clone(),
            invitation_url: invitation_url.clone(),
            expires_in_days: ttl_days,
        },
    )?;

    let now = Utc::now();
    let invitation = family_invitation::ActiveModel {
        family_id: Set(family.id),
        email: Set(message.to.clone()),
        token: Set(token),
        invited_by: Set(user_id.to_string()),
        expires_at: Set(now + Duration::days(ttl_days)),
        used_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Invitation {} created for family {}", invitation.id, family.id);

    let dispatch_warning = match dispatcher.dispatch(&message).await {
        Ok(()) => None,
        Err(e) => {
            warn!("Invitation {} stored but email failed: {}", invitation.id, e);
            Some(format!("The invitation was created but the email could not be sent: {e}"))
        }
    };

    Ok(InvitationOutcome {
        invitation,
        invitation_url,
        dispatch_warning,
    })
}

/// Redeems an invitation token, making `user_id` a member of its family.
#[instrument(skip(db, token))]
pub async fn accept_invitation(
    db: &DatabaseConnection,
    token: &str,
    user_id: &str,
) -> Result<family_member::Model> {
    let txn = db.begin().await?;

    let invitation = FamilyInvitation::find()
        .filter(family_invitation::Column::Token.eq(token.trim()))
        .one(&txn)
        .await?
        .filter(|inv| inv.is_redeemable(Utc::now()))
        .ok_or(Error::InvitationUnavailable)?;

    if get_membership(&txn, user_id).await?.is_some() {
        return Err(Error::AlreadyInFamily {
            user_id: user_id.to_string(),
        });
    }

    let family_id = invitation.family_id;
    let member = insert_member(&txn, family_id, user_id, FamilyRole::Member).await?;
    let mut used: family_invitation::ActiveModel = invitation.into();
    used.used_at = Set(Some(Utc::now()));
    used.update(&txn).await?;
    txn.commit().await?;

    info!("User {} joined family {}", user_id, family_id);
    Ok(member)
}

/// Removes the user from their family.
///
/// An owner leaving hands ownership to the longest-standing remaining member; the
/// last member leaving deletes the family.
#[instrument(skip(db))]
pub async fn leave_family(db: &DatabaseConnection, user_id: &str) -> Result<()> {
    let txn = db.begin().await?;
    let membership = get_membership(&txn, user_id)
        .await?
        .ok_or_else(|| Error::FamilyNotFound {
            user_id: user_id.to_string(),
        })?;
    let family_id = membership.family_id;
    let was_owner = membership.role == FamilyRole::Owner;
    FamilyMember::delete_by_id(membership.id).exec(&txn).await?;

    let successor = FamilyMember::find()
        .filter(family_member::Column::FamilyId.eq(family_id))
        .order_by_asc(family_member::Column::JoinedAt)
        .one(&txn)
        .await?;
    match successor {
        None => {
            Family::delete_by_id(family_id).exec(&txn).await?;
            info!("Family {} removed after its last member left", family_id);
        }
        Some(next) if was_owner => {
            let mut promoted: family_member::ActiveModel = next.into();
            promoted.role = Set(FamilyRole::Owner);
            promoted.update(&txn).await?;
        }
        Some(_) => {}
    }
    txn.commit().await?;
    Ok(())
}
