use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulated minutes since the restaurant opened.
pub type Minutes = u32;

/// Identifier of a customer party, 1-based as in the arrival schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub(crate) u32);

impl CustomerId {
    /// Create a customer ID; zero is not a valid schedule id
    pub fn new(id: u32) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Waiter identifier, rendered with the letters U, V, W, X, Y
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaiterId(pub(crate) usize);

impl WaiterId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WaiterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_letter(f, 'U', self.0)
    }
}

/// Cook identifier, rendered with the letters C, D
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CookId(pub(crate) usize);

impl CookId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for CookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_letter(f, 'C', self.0)
    }
}

// Letters run out at 'Z'; later staff fall back to a numeric tag.
fn write_letter(f: &mut fmt::Formatter<'_>, first: char, index: usize) -> fmt::Result {
    let letter = u32::try_from(index)
        .ok()
        .and_then(|offset| char::from_u32(first as u32 + offset))
        .filter(|c| c.is_ascii_uppercase());
    match letter {
        Some(c) => write!(f, "{}", c),
        None => write!(f, "#{}", index),
    }
}

/// The acting role attached to every recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Customer(CustomerId),
    Waiter(WaiterId),
    Cook(CookId),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer(id) => write!(f, "Customer {}", id),
            Role::Waiter(id) => write!(f, "Waiter {}", id),
            Role::Cook(id) => write!(f, "Cook {}", id),
        }
    }
}

/// A customer's order as it sits in a waiter's queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub customer: CustomerId,
    pub party_size: u32,
}

/// An order relayed by a waiter to the shared cook queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookOrder {
    pub waiter: WaiterId,
    pub customer: CustomerId,
    pub party_size: u32,
}
