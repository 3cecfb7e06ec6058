//! Checkout assembly: cart + addresses + shipping method → checkout draft.

use common::AddressId;
use serde::{Deserialize, Serialize};

use crate::addresses::{AddressInput, AddressProvider, SavedAddress};
use crate::context::RequestContext;
use crate::error::DomainError;
use crate::money::Money;
use crate::order::{self, Address, OrderLine, ProductId, ShippingMethod};
use crate::pricing::{Pricing, compute_pricing};

/// A cart entry as held by the client session before checkout.
///
/// The unit price was snapshotted when the item went into the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    /// Freezes this cart line into an order line snapshot.
    pub fn snapshot(self) -> OrderLine {
        OrderLine {
            product_id: self.product_id,
            name: self.name,
            image: self.image,
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}

/// The buyer's choice of shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressSelection {
    /// Use an address already saved in the buyer's address book.
    #[serde(rename_all = "camelCase")]
    UseSaved { address_id: AddressId },

    /// Use freshly entered address values, optionally persisting them to the
    /// address book for future orders.
    #[serde(rename_all = "camelCase")]
    UseNew {
        address: AddressInput,
        #[serde(default)]
        persist: bool,
    },
}

/// The ephemeral bundle produced between the checkout and payment steps.
///
/// Held by the active checkout session only. Immutable once issued: a buyer
/// who returns to checkout gets a new draft, the old one is superseded. The
/// pricing inside is the buyer-facing estimate; order creation recomputes it
/// authoritatively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    pub order_lines: Vec<OrderLine>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub shipping_method: ShippingMethod,
    pub pricing: Pricing,
}

/// Assembles checkout drafts, resolving the address selection through the
/// external address provider.
pub struct CheckoutAssembler<A: AddressProvider> {
    addresses: A,
}

impl<A: AddressProvider> CheckoutAssembler<A> {
    /// Creates a new assembler backed by the given address provider.
    pub fn new(addresses: A) -> Self {
        Self { addresses }
    }

    /// Returns a reference to the underlying address provider.
    pub fn address_provider(&self) -> &A {
        &self.addresses
    }

    /// Builds a checkout draft from the cart contents and selections.
    ///
    /// The only side effect is the optional address persistence delegated to
    /// the provider.
    #[tracing::instrument(skip(self, cart_lines, shipping, billing))]
    pub async fn assemble(
        &self,
        ctx: &RequestContext,
        cart_lines: Vec<CartLine>,
        shipping: AddressSelection,
        billing: Option<AddressInput>,
        shipping_method: ShippingMethod,
    ) -> Result<CheckoutDraft, DomainError> {
        let order_lines: Vec<OrderLine> = cart_lines.into_iter().map(CartLine::snapshot).collect();
        order::validate_lines(&order_lines)?;

        let shipping_address = self.resolve_shipping_address(ctx, shipping).await?;

        // Billing is copied from shipping at assembly time, not referenced,
        // so later edits to one cannot silently alter the other.
        let billing_address = match billing {
            Some(input) => address_from_input(input),
            None => shipping_address.clone(),
        };

        let pricing = compute_pricing(&order_lines, shipping_method);

        Ok(CheckoutDraft {
            order_lines,
            shipping_address,
            billing_address,
            shipping_method,
            pricing,
        })
    }

    async fn resolve_shipping_address(
        &self,
        ctx: &RequestContext,
        selection: AddressSelection,
    ) -> Result<Address, DomainError> {
        match selection {
            AddressSelection::UseSaved { address_id } => {
                let saved = self
                    .addresses
                    .get(address_id)
                    .await?
                    .ok_or(DomainError::AddressNotFound(address_id))?;
                if saved.owner != ctx.user_id {
                    return Err(DomainError::Forbidden);
                }
                Ok(address_from_saved(saved))
            }
            AddressSelection::UseNew {
                address,
                persist: true,
            } => {
                let saved = self.addresses.create(ctx.user_id, address).await?;
                Ok(address_from_saved(saved))
            }
            AddressSelection::UseNew {
                address,
                persist: false,
            } => Ok(address_from_input(address)),
        }
    }
}

fn address_from_input(input: AddressInput) -> Address {
    Address {
        address_id: None,
        street: input.street,
        city: input.city,
        state: input.state,
        zip_code: input.zip_code,
        country: input.country,
        phone: input.phone,
    }
}

fn address_from_saved(saved: SavedAddress) -> Address {
    Address {
        address_id: Some(saved.id),
        street: saved.street,
        city: saved.city,
        state: saved.state,
        zip_code: saved.zip_code,
        country: saved.country,
        phone: saved.phone,
    }
}
