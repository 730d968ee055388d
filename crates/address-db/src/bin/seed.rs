//! # Seed Data Generator
//!
//! Populates the database with demo companies, addresses and customers.
//!
//! ## Usage
//! ```bash
//! cargo run -p address-db --bin seed
//!
//! # Specify database path
//! cargo run -p address-db --bin seed -- --db ./data/addresses.db
//! ```
//!
//! ## Generated Data
//! For every company in [`COMPANIES`]:
//! - a billing address and a flagged shipping address, both linked to the company
//! - one customer whose primary address is a customer-linked address
//!
//! Plus country templates for the United States and Germany.

use std::env;

use address_core::{Address, AddressLink, AddressTemplate, AddressType, Customer};
use address_db::{get_shipping_address, Database, DbConfig};

/// (company, street, city, state, pincode, country)
const COMPANIES: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("Acme", "1 Industrial Way", "Springfield", "IL", "62701", "United States"),
    ("Globex", "200 Cypress Creek Rd", "Cypress Creek", "OR", "97005", "United States"),
    ("Initech", "Hauptstraße 5", "Berlin", "", "10115", "Germany"),
];

const TEMPLATES: &[(&str, &str, bool)] = &[
    (
        "United States",
        "{{address_line1}}\n{{address_line2}}\n{{city}}, {{state}} {{pincode}}\n{{country}}\nPhone: {{phone}}",
        true,
    ),
    (
        "Germany",
        "{{address_line1}}\n{{address_line2}}\n{{pincode}} {{city}}\n{{country}}",
        false,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./addresses_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Address Book Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./addresses_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Address Book Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.addresses().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} addresses", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (country, template, is_default) in TEMPLATES {
        db.templates()
            .upsert(&AddressTemplate {
                country: country.to_string(),
                template: template.to_string(),
                is_default: *is_default,
            })
            .await?;
    }
    println!("✓ {} address templates", TEMPLATES.len());

    let lifecycle = db.lifecycle();

    for (company, street, city, state, pincode, country) in COMPANIES {
        let mut billing = company_address(company, street, city, state, pincode, country);
        billing.address_type = AddressType::Billing;
        lifecycle.save(billing).await?;

        let mut shipping = company_address(company, street, city, state, pincode, country);
        shipping.address_type = AddressType::Shipping;
        shipping.address_line2 = Some("Loading Dock B".to_string());
        shipping.is_shipping_address = true;
        lifecycle.save(shipping).await?;

        let customer_name = format!("{} Customer", company);
        let mut customer_address = Address::new(&customer_name, *street, *city, *country);
        customer_address.pincode = Some(pincode.to_string());
        customer_address
            .links
            .push(AddressLink::new(address_core::CUSTOMER_DOCTYPE, &customer_name));
        let customer_address = lifecycle.save(customer_address).await?;

        db.customers()
            .insert(&Customer {
                name: customer_name.clone(),
                customer_name: customer_name.clone(),
                email_id: None,
                customer_primary_address: Some(customer_address.name.clone()),
                primary_address: None,
            })
            .await?;
        lifecycle.on_update(&customer_address).await?;

        println!("✓ {}: billing, shipping, customer", company);
    }

    println!();
    println!("Verifying shipping lookup...");
    for (company, ..) in COMPANIES {
        match get_shipping_address(&db, company, None).await? {
            Some(found) => println!("  {} → {}", company, found.name),
            None => println!("  {} → (none)", company),
        }
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn company_address(
    company: &str,
    street: &str,
    city: &str,
    state: &str,
    pincode: &str,
    country: &str,
) -> Address {
    let mut address = Address::new(company, street, city, country);
    if !state.is_empty() {
        address.state = Some(state.to_string());
    }
    address.pincode = Some(pincode.to_string());
    address.links.push(AddressLink::company(company));
    address
}
