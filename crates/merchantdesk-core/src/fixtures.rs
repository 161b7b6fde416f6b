//! Built-in seed merchants used when no local mirror exists yet

use super::models::{Address, Merchant};
use super::types::MerchantStatus;

struct Seed {
    merchant_id: &'static str,
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    country: &'static str,
    city: &'static str,
    status: MerchantStatus,
    created_at: &'static str,
}

const SEEDS: [Seed; 9] = [
    Seed {
        merchant_id: "d2596441-93b6-47c5-8abb-e891b3d3092a",
        name: "TechNova USA",
        email: "support@techstore.com",
        phone: "+1-555-1234",
        country: "USA",
        city: "Los Angeles",
        status: MerchantStatus::Active,
        created_at: "2025-11-01T14:37:13.922Z",
    },
    Seed {
        merchant_id: "3e7b42c8-1085-4f06-aee4-934a323d63da",
        name: "Himalayan Tech Hub",
        email: "info@himelectronics.com",
        phone: "9800001234",
        country: "Nepal",
        city: "Kathmandu",
        status: MerchantStatus::Active,
        created_at: "2025-11-03T14:37:13.922Z",
    },
    Seed {
        merchant_id: "77e242a8-a181-48da-8da9-5c3bab3aed24",
        name: "Global Gadgetry",
        email: "contact@globalgadgets.com",
        phone: "+44 20 7946 0000",
        country: "UK",
        city: "Manchester",
        status: MerchantStatus::Inactive,
        created_at: "2025-11-05T14:37:13.922Z",
    },
    Seed {
        merchant_id: "7730ce2e-2eff-428c-bf39-7a00270ab193",
        name: "Smart Tech Solutions",
        email: "hello@smarttech.com",
        phone: "9876543210",
        country: "India",
        city: "New Delhi",
        status: MerchantStatus::Active,
        created_at: "2025-11-08T14:37:13.922Z",
    },
    Seed {
        merchant_id: "9c4d068d-7624-4741-bd22-c489e5916c99",
        name: "Digital Planet Store",
        email: "service@digitalworld.com",
        phone: "9801122334",
        country: "Nepal",
        city: "Pokhara",
        status: MerchantStatus::Inactive,
        created_at: "2025-11-10T14:37:13.922Z",
    },
    Seed {
        merchant_id: "94b219a0-9566-4c59-a8c6-5cf4b1394ccf",
        name: "Everest Tech Center",
        email: "info@everesthub.com",
        phone: "9812345678",
        country: "Nepal",
        city: "Lalitpur",
        status: MerchantStatus::Active,
        created_at: "2025-11-14T14:37:13.922Z",
    },
    Seed {
        merchant_id: "8ff50e3c-79e0-4c13-b724-cce4586d528c",
        name: "Asia Electronics Hub",
        email: "support@asiaelectronics.com",
        phone: "+65 6789 4321",
        country: "Singapore",
        city: "Singapore",
        status: MerchantStatus::Active,
        created_at: "2025-11-17T14:37:13.922Z",
    },
    Seed {
        merchant_id: "47757f7a-221f-4fc8-a358-7bbc03b0f099",
        name: "Prime Tech World",
        email: "contact@primetech.com",
        phone: "+61 421 789 123",
        country: "Australia",
        city: "Sydney",
        status: MerchantStatus::Inactive,
        created_at: "2025-11-20T14:37:13.922Z",
    },
    Seed {
        merchant_id: "5c923eef-7806-4a62-b077-9d09c9508552",
        name: "Urban Gadget Market",
        email: "hello@urbantech.com",
        phone: "9841231234",
        country: "Nepal",
        city: "Kathmandu",
        status: MerchantStatus::Deactivated,
        created_at: "2025-11-23T14:37:13.922Z",
    },
];

/// The nine seed merchants, ids 1 through 9
pub fn seed_merchants() -> Vec<Merchant> {
    SEEDS
        .iter()
        .zip(1u64..)
        .map(|(seed, id)| Merchant {
            id,
            merchant_id: seed.merchant_id.to_string(),
            name: seed.name.to_string(),
            email: seed.email.to_string(),
            phone: Some(seed.phone.to_string()),
            address: Some(Address {
                country: Some(seed.country.to_string()),
                city: Some(seed.city.to_string()),
                ..Default::default()
            }),
            status: Some(seed.status),
            created_at: Some(seed.created_at.to_string()),
            updated_at: Some(seed.created_at.to_string()),
            ..Default::default()
        })
        .collect()
}
