//! Argument checks run before any statement reaches the store.
use super::StoreError;
use crate::db_types::{ConversationKey, Listing, ListingKind, NewMatch, UserId};

fn invalid<S: Into<String>>(msg: S) -> StoreError {
    StoreError::InvalidArgument(msg.into())
}

pub fn require_user(user: &UserId, what: &str) -> Result<(), StoreError> {
    if user.is_blank() {
        return Err(invalid(format!("{what} must not be blank")));
    }
    Ok(())
}

pub fn require_id(id: i64, what: &str) -> Result<(), StoreError> {
    if id <= 0 {
        return Err(invalid(format!("{what} must be a positive id, got {id}")));
    }
    Ok(())
}

impl NewMatch {
    /// Builds the pair key for a `buy` (requesting) and `sell` (selling) listing, rejecting pairs that can never be a
    /// legal match.
    pub fn validated(buy: &Listing, sell: &Listing, score: u32) -> Result<Self, StoreError> {
        require_id(buy.id, "buy listing")?;
        require_id(sell.id, "sell listing")?;
        if buy.kind != ListingKind::Requesting {
            return Err(invalid(format!("listing {} is not a requesting listing", buy.id)));
        }
        if sell.kind != ListingKind::Selling {
            return Err(invalid(format!("listing {} is not a selling listing", sell.id)));
        }
        require_user(&buy.owner_id, "buyer")?;
        require_user(&sell.owner_id, "seller")?;
        if buy.owner_id == sell.owner_id {
            return Err(invalid(format!("{} cannot be matched with themselves", buy.owner_id)));
        }
        Ok(NewMatch::from_pair(buy, sell, score))
    }
}

impl ConversationKey {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_id(self.post_id, "post")?;
        require_user(&self.buyer_id, "buyer")?;
        require_user(&self.seller_id, "seller")?;
        if self.buyer_id == self.seller_id {
            return Err(invalid("buyer and seller must be different users"));
        }
        Ok(())
    }
}
