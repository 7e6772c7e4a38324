use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::{Dealer, Order, OrderItem};
use crate::report::ItemSource;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS dealers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    business_name TEXT,
    city TEXT,
    state TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY,
    order_number TEXT NOT NULL UNIQUE,
    dealer_id INTEGER NOT NULL,
    order_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    net_amount REAL NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0,
    region TEXT,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (dealer_id) REFERENCES dealers(id)
);

CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY,
    order_id INTEGER NOT NULL,
    product TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    unit_price REAL NOT NULL,
    total_price REAL NOT NULL,
    FOREIGN KEY (order_id) REFERENCES orders(id)
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// All orders with their dealer name joined in, oldest first. The report
/// engine receives this collection by value and derives every view from it.
pub fn fetch_orders(conn: &Connection) -> Result<Vec<Order>> {
    let mut stmt = conn.prepare(
        "SELECT o.id, o.order_number, o.dealer_id, d.name, o.order_date, o.status, \
         o.net_amount, o.quantity, o.region, o.description \
         FROM orders o JOIN dealers d ON o.dealer_id = d.id \
         ORDER BY o.order_date, o.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Order {
            id: row.get(0)?,
            order_number: row.get(1)?,
            dealer_id: row.get(2)?,
            dealer_name: row.get(3)?,
            order_date: row.get(4)?,
            status: row.get(5)?,
            net_amount: row.get(6)?,
            quantity: row.get(7)?,
            region: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            description: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            extra: Default::default(),
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn fetch_dealers(conn: &Connection) -> Result<Vec<Dealer>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, business_name, city, state FROM dealers ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Dealer {
            id: row.get(0)?,
            name: row.get(1)?,
            business_name: row.get(2)?,
            city: row.get(3)?,
            state: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn dealer_by_name(conn: &Connection, name: &str) -> Result<Option<Dealer>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, business_name, city, state FROM dealers WHERE name = ?1 COLLATE NOCASE",
    )?;
    let mut rows = stmt.query_map([name], |row| {
        Ok(Dealer {
            id: row.get(0)?,
            name: row.get(1)?,
            business_name: row.get(2)?,
            city: row.get(3)?,
            state: row.get(4)?,
        })
    })?;
    rows.next().transpose().map_err(Into::into)
}

pub fn order_id_by_number(conn: &Connection, order_number: &str) -> Result<Option<i64>> {
    let mut stmt =
        conn.prepare("SELECT id FROM orders WHERE order_number = ?1 COLLATE NOCASE")?;
    let mut rows = stmt.query_map([order_number], |row| row.get(0))?;
    rows.next().transpose().map_err(Into::into)
}

/// The SQLite store doubles as the drill-down collaborator.
pub struct Store<'a> {
    pub conn: &'a Connection,
}

impl ItemSource for Store<'_> {
    fn items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, order_id, product, quantity, unit_price, total_price \
             FROM order_items WHERE order_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([order_id], |row| {
            Ok(OrderItem {
                id: row.get(0)?,
                order_id: row.get(1)?,
                product: row.get(2)?,
                quantity: row.get(3)?,
                unit_price: row.get(4)?,
                total_price: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
