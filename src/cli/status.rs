use crate::db::get_connection;
use crate::error::Result;
use crate::settings::{db_path, load_settings};

pub fn run() -> Result<String> {
    let settings = load_settings();
    let path = db_path();
    if !path.exists() {
        return Ok(format!(
            "No database at {} \u{2014} run `salescope init` first.",
            path.display()
        ));
    }

    let conn = get_connection(&path)?;
    let dealers: i64 = conn.query_row("SELECT count(*) FROM dealers", [], |r| r.get(0))?;
    let orders: i64 = conn.query_row("SELECT count(*) FROM orders", [], |r| r.get(0))?;
    let items: i64 = conn.query_row("SELECT count(*) FROM order_items", [], |r| r.get(0))?;
    let span: Option<(String, String)> = conn
        .query_row(
            "SELECT min(order_date), max(order_date) FROM orders",
            [],
            |r| Ok((r.get::<_, Option<String>>(0)?, r.get::<_, Option<String>>(1)?)),
        )
        .map(|(min, max)| min.zip(max))?;

    let mut out = String::new();
    out.push_str(&format!("Data directory: {}\n", settings.data_dir));
    if !settings.company_name.is_empty() {
        out.push_str(&format!("Company: {}\n", settings.company_name));
    }
    out.push_str(&format!(
        "Dealers: {dealers}\nOrders: {orders}\nLine items: {items}"
    ));
    if let Some((min, max)) = span {
        out.push_str(&format!("\nOrder dates: {min} to {max}"));
    }
    Ok(out)
}
