use crate::error::AppResult;

pub mod cart;
pub mod orders;

/// A request schema checked before it reaches business logic.
pub trait Validate {
    type Valid;

    fn validate(self) -> AppResult<Self::Valid>;
}

impl Validate for orders::CheckoutRequest {
    type Valid = orders::ValidCheckout;

    fn validate(self) -> AppResult<Self::Valid> {
        orders::ValidCheckout::try_from(self)
    }
}
