use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

use crate::dates::{end_of_month, sub_months};
use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::db_path;

// (name, business, city, state)
const DEALERS: &[(&str, Option<&str>, &str, &str)] = &[
    ("Green Farms", Some("Green Farms Pvt Ltd"), "Bengaluru", "Karnataka"),
    ("Agri Supplies", Some("Agri Supplies & Co"), "Pune", "Maharashtra"),
    ("Kisan Depot", None, "Chennai", "Tamil Nadu"),
    ("Bharat Agro", Some("Bharat Agro Traders"), "Lucknow", "Uttar Pradesh"),
    ("Hind Seeds", None, "Patna", "Bihar"),
    ("Punjab Agro Mart", Some("Punjab Agro Mart Ltd"), "Ludhiana", "Punjab"),
];

// (product, unit price)
const PRODUCTS: &[(&str, f64)] = &[
    ("Bio-Fertilizer", 3125.0),
    ("Pesticide", 1850.0),
    ("Growth Enhancer", 2400.0),
    ("Soil Conditioner", 1500.0),
    ("Micro Nutrients", 2750.0),
];

const REGIONS: &[&str] = &["South", "West", "South", "North", "East", "North"];

/// Status rotation; delivered appears twice so the demo conversion rate
/// lands in a realistic band.
const STATUSES: &[&str] = &[
    "delivered",
    "pending",
    "shipped",
    "delivered",
    "processing",
    "cancelled",
];

/// Order days within each month, clamped to the month length.
const ORDER_DAYS: &[u32] = &[2, 5, 8, 11, 14, 17, 20, 23, 26, 28];

const MONTHS: u32 = 6;

#[derive(Debug, Clone)]
pub struct OrderSeed {
    pub order_number: String,
    pub dealer_idx: usize,
    pub date: String,
    pub status: &'static str,
    pub quantity: i64,
    pub net_amount: f64,
    pub region: &'static str,
    pub product: &'static str,
    pub unit_price: f64,
}

fn make_date(year: i32, month: u32, day: u32) -> String {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    let d = day.min(end_of_month(first).day());
    format!("{year:04}-{month:02}-{d:02}")
}

/// Build six months of orders ending at the current month. Index
/// arithmetic rotates dealers, products, and statuses so the dataset is
/// varied but fully deterministic.
pub fn generate_orders(today: NaiveDate) -> Vec<OrderSeed> {
    let mut seeds = Vec::new();
    let mut counter = 0usize;
    for offset in (0..MONTHS).rev() {
        let month_anchor = sub_months(today, offset);
        let (year, month) = (month_anchor.year(), month_anchor.month());
        for (slot, day) in ORDER_DAYS.iter().enumerate() {
            counter += 1;
            let dealer_idx = (slot + offset as usize) % DEALERS.len();
            let (product, unit_price) = PRODUCTS[(slot + offset as usize * 2) % PRODUCTS.len()];
            let quantity = 10 + ((slot * 7 + offset as usize * 13) % 90) as i64;
            seeds.push(OrderSeed {
                order_number: format!("ORD-{counter:05}"),
                dealer_idx,
                date: make_date(year, month, *day),
                status: STATUSES[(slot + offset as usize) % STATUSES.len()],
                quantity,
                net_amount: quantity as f64 * unit_price,
                region: REGIONS[dealer_idx],
                product,
                unit_price,
            });
        }
    }
    seeds
}

fn insert_all(conn: &mut Connection, seeds: &[OrderSeed]) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM order_items", [])?;
    tx.execute("DELETE FROM orders", [])?;
    tx.execute("DELETE FROM dealers", [])?;

    let mut dealer_ids = Vec::new();
    for (name, business, city, state) in DEALERS {
        tx.execute(
            "INSERT INTO dealers (name, business_name, city, state) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![name, business, city, state],
        )?;
        dealer_ids.push(tx.last_insert_rowid());
    }

    for seed in seeds {
        tx.execute(
            "INSERT INTO orders (order_number, dealer_id, order_date, status, net_amount, quantity, region, description) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                seed.order_number,
                dealer_ids[seed.dealer_idx],
                seed.date,
                seed.status,
                seed.net_amount,
                seed.quantity,
                seed.region,
                seed.product,
            ],
        )?;
        let order_id = tx.last_insert_rowid();

        // Larger orders split into two line items of the same product.
        if seed.quantity >= 40 {
            let first = seed.quantity / 2;
            let second = seed.quantity - first;
            for qty in [first, second] {
                tx.execute(
                    "INSERT INTO order_items (order_id, product, quantity, unit_price, total_price) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        order_id,
                        seed.product,
                        qty,
                        seed.unit_price,
                        qty as f64 * seed.unit_price
                    ],
                )?;
            }
        } else {
            tx.execute(
                "INSERT INTO order_items (order_id, product, quantity, unit_price, total_price) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    order_id,
                    seed.product,
                    seed.quantity,
                    seed.unit_price,
                    seed.net_amount
                ],
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn run() -> Result<String> {
    let path = db_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut conn = get_connection(&path)?;
    init_db(&conn)?;

    let today = chrono::Local::now().date_naive();
    let seeds = generate_orders(today);
    insert_all(&mut conn, &seeds)?;

    Ok(format!(
        "Loaded demo data: {} dealers, {} orders across {} months.\nTry `salescope report summary --range last_3_months`.",
        DEALERS.len(),
        seeds.len(),
        MONTHS,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_iso;

    fn today() -> NaiveDate {
        parse_iso("2025-06-15").unwrap()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate_orders(today());
        let b = generate_orders(today());
        assert_eq!(a.len(), b.len());
        assert_eq!(a[0].order_number, b[0].order_number);
        assert_eq!(a[0].net_amount, b[0].net_amount);
        assert_eq!(a.last().unwrap().date, b.last().unwrap().date);
    }

    #[test]
    fn test_generate_spans_six_months_oldest_first() {
        let seeds = generate_orders(today());
        assert_eq!(seeds.len(), MONTHS as usize * ORDER_DAYS.len());
        assert!(seeds[0].date.starts_with("2025-01"));
        assert!(seeds.last().unwrap().date.starts_with("2025-06"));
    }

    #[test]
    fn test_generate_amounts_are_consistent() {
        for seed in generate_orders(today()) {
            assert_eq!(seed.net_amount, seed.quantity as f64 * seed.unit_price);
            assert!(seed.quantity >= 10);
        }
    }

    #[test]
    fn test_generate_covers_every_status_and_dealer() {
        let seeds = generate_orders(today());
        for status in STATUSES {
            assert!(seeds.iter().any(|s| s.status == *status), "missing {status}");
        }
        for idx in 0..DEALERS.len() {
            assert!(seeds.iter().any(|s| s.dealer_idx == idx));
        }
    }

    #[test]
    fn test_insert_all_populates_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = get_connection(&dir.path().join("demo.db")).unwrap();
        init_db(&conn).unwrap();
        let seeds = generate_orders(today());
        insert_all(&mut conn, &seeds).unwrap();

        let orders: i64 = conn
            .query_row("SELECT count(*) FROM orders", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orders as usize, seeds.len());
        let items: i64 = conn
            .query_row("SELECT count(*) FROM order_items", [], |r| r.get(0))
            .unwrap();
        assert!(items as usize >= seeds.len());

        // Reloading replaces rather than duplicates.
        insert_all(&mut conn, &seeds).unwrap();
        let orders_again: i64 = conn
            .query_row("SELECT count(*) FROM orders", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orders, orders_again);
    }
}
