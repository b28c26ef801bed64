//! Demo data seed script
//!
//! Seeds the database with a realistic month of drop-in center activity:
//! - 3 staff users: 1 admin, 1 staff, 1 check-in station
//! - A guest roster, with per-guest meal logs on service days
//! - Standing bulk meal entries (RV, lunch bags, day workers)
//! - Today's shower and laundry bookings plus one blocked slot
//! - A bicycle repair queue and a few guest reminders
//!
//! Usage:
//!   DATABASE_URL=... DEMO_PASSWORD=Demo2024! ./seed-demo --guests 40
//!
//! Environment variables:
//!   DATABASE_URL   — PostgreSQL connection string (required)
//!   DEMO_PASSWORD  — Password for all demo accounts (default: Demo2024!)

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Utc};
use clap::Parser;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::postgres::PgPoolOptions;
use std::env;
use uuid::Uuid;

use dropin_api::models::meal::MealCategory;
use dropin_api::services::auto_meals::plan_for;
use dropin_api::services::meal_report::ONSITE_SERVICE_DAYS;
use dropin_api::services::slots;

#[derive(Parser)]
#[command(name = "seed-demo", about = "Seed the drop-in database with demo data")]
struct Args {
    /// Number of demo guests to create
    #[arg(long, default_value_t = 40)]
    guests: usize,

    /// Days of meal history to generate
    #[arg(long, default_value_t = 30)]
    days: i64,
}

const FIRST_NAMES: &[&str] = &[
    "James", "Maria", "Robert", "Linda", "David", "Susan", "Carlos", "Angela", "Kevin", "Diane",
    "Miguel", "Patricia", "Thomas", "Gloria", "Daniel", "Rosa",
];
const LAST_NAMES: &[&str] = &[
    "Nguyen", "Garcia", "Smith", "Johnson", "Hernandez", "Brown", "Tran", "Lopez", "Washington",
    "Kim", "Martinez", "Davis",
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL required")?;
    let demo_password = env::var("DEMO_PASSWORD").unwrap_or_else(|_| "Demo2024!".to_string());

    println!("=== Seed Demo Data ===");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    dropin_api::db::run_migrations(&pool).await?;

    // 1. Clean existing data
    println!("Cleaning existing data...");
    for table in [
        "guest_reminders",
        "bicycle_records",
        "booking_records",
        "blocked_slots",
        "meal_records",
        "guests",
        "staff_users",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&pool)
            .await
            .with_context(|| format!("Failed to clear {table}"))?;
    }

    // 2. Staff users (cost 10 for seed speed)
    println!("Inserting staff users...");
    let password_hash =
        bcrypt::hash(&demo_password, 10).context("Failed to hash demo password")?;

    let staff = [
        ("admin@demo.dropin.local", "Alice", "Nguyen", "admin"),
        ("staff@demo.dropin.local", "Ben", "Okafor", "staff"),
        ("checkin@demo.dropin.local", "Front", "Desk", "checkin"),
    ];
    for (email, first, last, role) in &staff {
        sqlx::query(
            "INSERT INTO staff_users (email, password_hash, first_name, last_name, role)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(email)
        .bind(&password_hash)
        .bind(first)
        .bind(last)
        .bind(role)
        .execute(&pool)
        .await
        .with_context(|| format!("Failed to insert staff user {email}"))?;
    }

    // 3. Guests
    println!("Inserting {} guests...", args.guests);
    let mut rng = rand::thread_rng();
    let mut guest_ids = Vec::with_capacity(args.guests);
    for _ in 0..args.guests {
        let first = FIRST_NAMES.choose(&mut rng).unwrap();
        let last = LAST_NAMES.choose(&mut rng).unwrap();
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO guests (first_name, last_name) VALUES ($1, $2) RETURNING id",
        )
        .bind(first)
        .bind(last)
        .fetch_one(&pool)
        .await?;
        guest_ids.push(id);
    }

    // 4. Meal history: per-guest logs on service days, standing bulk entries
    println!("Inserting {} days of meal history...", args.days);
    let today = Utc::now().date_naive();
    for offset in (0..args.days).rev() {
        let date = today - Duration::days(offset);
        let day_of_week = date.weekday().num_days_from_sunday();
        if !ONSITE_SERVICE_DAYS.contains(&day_of_week) {
            continue;
        }
        let date_str = date.format("%Y-%m-%d").to_string();

        // A random subset of guests eats on each service day
        let diners = rng.gen_range(guest_ids.len() / 3..=guest_ids.len() * 2 / 3);
        for guest_id in guest_ids.choose_multiple(&mut rng, diners) {
            sqlx::query(
                "INSERT INTO meal_records (guest_id, category, date, count)
                 VALUES ($1, $2, $3, 1)",
            )
            .bind(guest_id)
            .bind(MealCategory::Guest.to_string())
            .bind(&date_str)
            .execute(&pool)
            .await?;

            if rng.gen_bool(0.2) {
                sqlx::query(
                    "INSERT INTO meal_records (guest_id, category, date, count)
                     VALUES ($1, $2, $3, 1)",
                )
                .bind(guest_id)
                .bind(MealCategory::Extra.to_string())
                .bind(&date_str)
                .execute(&pool)
                .await?;
            }
        }

        for &(category, count) in plan_for(day_of_week) {
            sqlx::query(
                "INSERT INTO meal_records (category, date, count) VALUES ($1, $2, $3)",
            )
            .bind(category.to_string())
            .bind(&date_str)
            .bind(count)
            .execute(&pool)
            .await?;
        }
    }

    // 5. Today's bookings and one blocked slot
    println!("Inserting bookings...");
    for service in [
        dropin_api::models::booking::ServiceType::Shower,
        dropin_api::models::booking::ServiceType::Laundry,
    ] {
        let grid = slots::generate_slots(service, today);
        for slot in grid.iter().take(3) {
            let guest_id = guest_ids.choose(&mut rng).unwrap();
            sqlx::query(
                "INSERT INTO booking_records (service_type, guest_id, date, time)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT DO NOTHING",
            )
            .bind(service.to_string())
            .bind(guest_id)
            .bind(today)
            .bind(&slot.label)
            .execute(&pool)
            .await?;
        }
        if let Some(last) = grid.last() {
            sqlx::query(
                "INSERT INTO blocked_slots (service_type, date, time)
                 VALUES ($1, $2, $3)
                 ON CONFLICT DO NOTHING",
            )
            .bind(service.to_string())
            .bind(today)
            .bind(&last.label)
            .execute(&pool)
            .await?;
        }
    }

    // 6. Bicycle repair queue
    println!("Inserting bicycle repairs...");
    let repairs: [(&[&str], &str); 3] = [
        (&["Flat Tire"], "rear wheel"),
        (&["Brakes", "Chain"], "squeaky brakes, skipping chain"),
        (&["New Bicycle"], "frame cracked beyond repair"),
    ];
    for (types, description) in &repairs {
        let guest_id = guest_ids.choose(&mut rng).unwrap();
        let types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
        sqlx::query(
            "INSERT INTO bicycle_records (guest_id, repair_types, description)
             VALUES ($1, $2, $3)",
        )
        .bind(guest_id)
        .bind(&types)
        .bind(description)
        .execute(&pool)
        .await?;
    }

    // 7. Reminders
    println!("Inserting reminders...");
    let reminders = [
        ("Mail waiting at the front desk", vec!["all".to_string()]),
        ("Ask about housing referral", vec!["meal".to_string()]),
    ];
    for (message, services) in &reminders {
        let guest_id = guest_ids.choose(&mut rng).unwrap();
        sqlx::query(
            "INSERT INTO guest_reminders (guest_id, message, services)
             VALUES ($1, $2, $3)",
        )
        .bind(guest_id)
        .bind(message)
        .bind(services)
        .execute(&pool)
        .await?;
    }

    println!("Done. Log in with admin@demo.dropin.local / {demo_password}");
    Ok(())
}
