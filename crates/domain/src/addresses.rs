//! Address collaborator interface and in-memory implementation.
//!
//! Address book CRUD lives outside this core; checkout only needs to look up
//! a saved address or persist a new one. The collaborator, not this crate,
//! enforces that at most one address per owner is marked default.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{AddressId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// New address values supplied by the buyer at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A persisted address book entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    pub id: AddressId,
    pub owner: UserId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_default: bool,
}

/// Trait for the external address provider.
#[async_trait]
pub trait AddressProvider: Send + Sync {
    /// Persists a new address for an owner.
    ///
    /// The created address is never marked default; promoting an address to
    /// default is a separate explicit action on the provider's own surface.
    async fn create(&self, owner: UserId, input: AddressInput)
    -> Result<SavedAddress, DomainError>;

    /// Looks up an address by id.
    async fn get(&self, id: AddressId) -> Result<Option<SavedAddress>, DomainError>;

    /// Lists the addresses saved by an owner.
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<SavedAddress>, DomainError>;
}

/// In-memory address book for tests and the default wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAddressBook {
    state: Arc<RwLock<HashMap<AddressId, SavedAddress>>>,
}

impl InMemoryAddressBook {
    /// Creates a new empty address book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored addresses.
    pub fn address_count(&self) -> usize {
        self.state.read().unwrap().len()
    }

    /// Marks an address as the owner's default, clearing any previous
    /// default. Test helper standing in for the provider's own surface.
    pub fn set_default(&self, owner: UserId, id: AddressId) {
        let mut state = self.state.write().unwrap();
        for address in state.values_mut() {
            if address.owner == owner {
                address.is_default = address.id == id;
            }
        }
    }
}

#[async_trait]
impl AddressProvider for InMemoryAddressBook {
    async fn create(
        &self,
        owner: UserId,
        input: AddressInput,
    ) -> Result<SavedAddress, DomainError> {
        let address = SavedAddress {
            id: AddressId::new(),
            owner,
            street: input.street,
            city: input.city,
            state: input.state,
            zip_code: input.zip_code,
            country: input.country,
            phone: input.phone,
            is_default: false,
        };

        self.state
            .write()
            .unwrap()
            .insert(address.id, address.clone());

        Ok(address)
    }

    async fn get(&self, id: AddressId) -> Result<Option<SavedAddress>, DomainError> {
        Ok(self.state.read().unwrap().get(&id).cloned())
    }

    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<SavedAddress>, DomainError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .values()
            .filter(|a| a.owner == owner)
            .cloned()
            .collect())
    }
}
