//! Shipping details collected at checkout.

use crate::error::CommerceError;
use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// Where and how to deliver an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingDetails {
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

impl ShippingDetails {
    /// Create shipping details.
    pub fn new(
        phone: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            phone: phone.into(),
            address: address.into(),
            city: city.into(),
            country: country.into(),
        }
    }

    /// Start from what a signed-in buyer has on file.
    pub fn prefill_from(profile: &BuyerProfile) -> Self {
        Self {
            phone: profile.phone.clone().unwrap_or_default(),
            address: profile.street_address.clone().unwrap_or_default(),
            city: profile.city.clone().unwrap_or_default(),
            country: profile.country.clone().unwrap_or_default(),
        }
    }

    /// Get a field's value.
    pub fn get(&self, field: ShippingField) -> &str {
        match field {
            ShippingField::Phone => &self.phone,
            ShippingField::Address => &self.address,
            ShippingField::City => &self.city,
            ShippingField::Country => &self.country,
        }
    }

    /// Every field that is empty or whitespace, in form order.
    pub fn missing_fields(&self) -> Vec<ShippingField> {
        ShippingField::ALL
            .into_iter()
            .filter(|&f| self.get(f).trim().is_empty())
            .collect()
    }

    /// Check that every field is filled in.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let fields = self.missing_fields();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::Validation { fields })
        }
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        [&self.address, &self.city, &self.country]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A shipping form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingField {
    Phone,
    Address,
    City,
    Country,
}

impl ShippingField {
    /// All fields in form order.
    pub const ALL: [ShippingField; 4] = [
        ShippingField::Phone,
        ShippingField::Address,
        ShippingField::City,
        ShippingField::Country,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingField::Phone => "phone",
            ShippingField::Address => "address",
            ShippingField::City => "city",
            ShippingField::Country => "country",
        }
    }

    /// Field-level message shown next to the input.
    pub fn message(&self) -> &'static str {
        match self {
            ShippingField::Phone => "Phone number is required.",
            ShippingField::Address => "Address is required.",
            ShippingField::City => "City is required.",
            ShippingField::Country => "Country is required.",
        }
    }
}

/// Contact details stored against a signed-in buyer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuyerProfile {
    pub id: UserId,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}
