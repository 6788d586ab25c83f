// SPDX-License-Identifier: Apache-2.0

use crate::{CatalogStore, IdentityStore, OrderStore, StoreError};
use async_trait::async_trait;
use bazari_model::{
    ImageRef, LineItem, Order, OrderId, OrderStatus, PaymentMethod, Product, ProductId, Role,
    User, UserId,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::warn;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
  id TEXT PRIMARY KEY,
  username TEXT NOT NULL,
  email TEXT NOT NULL UNIQUE,
  password_hash TEXT,
  role TEXT NOT NULL DEFAULT 'user',
  google_id TEXT UNIQUE,
  profile_image TEXT,
  verified INTEGER NOT NULL DEFAULT 0,
  verification_token TEXT,
  order_ids TEXT NOT NULL DEFAULT '[]',
  created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS products (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  description TEXT NOT NULL DEFAULT '',
  price REAL NOT NULL,
  category TEXT NOT NULL,
  images TEXT NOT NULL DEFAULT '[]',
  created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS orders (
  id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL,
  line_items TEXT NOT NULL,
  payment_method TEXT NOT NULL,
  total_amount REAL NOT NULL,
  status TEXT NOT NULL,
  purchase_date TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);
";

/// rusqlite-backed implementation of all three store traits over a single
/// connection. Line items, images, and history lists are JSON text columns.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    atomic_history_append: bool,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            atomic_history_append: true,
        })
    }

    /// With `false`, `persist_order` issues the order insert and the history
    /// append as two independent writes: a failure between them leaves an
    /// order that no history list references. That is the behavior of the
    /// system this one replaces; the default wraps both in one transaction.
    #[must_use]
    pub fn with_atomic_history_append(mut self, atomic: bool) -> Self {
        self.atomic_history_append = atomic;
        self
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Encoding(format!("bad timestamp {raw:?}: {e}")))
}

struct RawUser {
    id: String,
    username: String,
    email: String,
    password_hash: Option<String>,
    role: String,
    google_id: Option<String>,
    profile_image: Option<String>,
    verified: bool,
    verification_token: Option<String>,
    order_ids: String,
    created_at: String,
}

fn read_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
    Ok(RawUser {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        google_id: row.get(5)?,
        profile_image: row.get(6)?,
        verified: row.get(7)?,
        verification_token: row.get(8)?,
        order_ids: row.get(9)?,
        created_at: row.get(10)?,
    })
}

impl RawUser {
    fn into_user(self) -> Result<User, StoreError> {
        let profile_image: Option<ImageRef> = match self.profile_image {
            Some(raw) => Some(serde_json::from_str(&raw)?),
            None => None,
        };
        Ok(User {
            id: UserId::parse(&self.id).map_err(|e| StoreError::Encoding(e.to_string()))?,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role: Role::parse(&self.role).map_err(|e| StoreError::Encoding(e.to_string()))?,
            google_id: self.google_id,
            profile_image,
            verified: self.verified,
            verification_token: self.verification_token,
            order_ids: serde_json::from_str(&self.order_ids)?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, google_id, \
     profile_image, verified, verification_token, order_ids, created_at";

fn find_user_where(
    conn: &Connection,
    clause: &str,
    key: &str,
) -> Result<Option<User>, StoreError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
    let raw = conn
        .query_row(&sql, params![key], read_user)
        .optional()?;
    raw.map(RawUser::into_user).transpose()
}

fn encode_profile_image(user: &User) -> Result<Option<String>, StoreError> {
    user.profile_image
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(StoreError::from)
}

struct RawOrder {
    id: String,
    user_id: String,
    line_items: String,
    payment_method: String,
    total_amount: f64,
    status: String,
    purchase_date: String,
}

fn read_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawOrder> {
    Ok(RawOrder {
        id: row.get(0)?,
        user_id: row.get(1)?,
        line_items: row.get(2)?,
        payment_method: row.get(3)?,
        total_amount: row.get(4)?,
        status: row.get(5)?,
        purchase_date: row.get(6)?,
    })
}

impl RawOrder {
    fn into_order(self) -> Result<Order, StoreError> {
        let line_items: Vec<LineItem> = serde_json::from_str(&self.line_items)?;
        Ok(Order {
            id: OrderId::parse(&self.id).map_err(|e| StoreError::Encoding(e.to_string()))?,
            user: UserId::parse(&self.user_id)
                .map_err(|e| StoreError::Encoding(e.to_string()))?,
            line_items,
            payment_method: PaymentMethod::parse(&self.payment_method)
                .map_err(|e| StoreError::Encoding(e.to_string()))?,
            total_amount: self.total_amount,
            status: OrderStatus::parse(&self.status)
                .map_err(|e| StoreError::Encoding(e.to_string()))?,
            purchase_date: parse_timestamp(&self.purchase_date)?,
        })
    }
}

const ORDER_COLUMNS: &str =
    "id, user_id, line_items, payment_method, total_amount, status, purchase_date";

fn insert_order_row(conn: &Connection, order: &Order) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO orders (id, user_id, line_items, payment_method, total_amount, status, purchase_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            order.id.as_str(),
            order.user.as_str(),
            serde_json::to_string(&order.line_items)?,
            order.payment_method.as_str(),
            order.total_amount,
            order.status.as_str(),
            order.purchase_date.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn append_history_row(conn: &Connection, order: &Order) -> Result<(), StoreError> {
    let raw: String = conn.query_row(
        "SELECT order_ids FROM users WHERE id = ?1",
        params![order.user.as_str()],
        |row| row.get(0),
    )?;
    let mut ids: Vec<OrderId> = serde_json::from_str(&raw)?;
    ids.push(order.id.clone());
    conn.execute(
        "UPDATE users SET order_ids = ?1 WHERE id = ?2",
        params![serde_json::to_string(&ids)?, order.user.as_str()],
    )?;
    Ok(())
}

fn find_order_by_id(conn: &Connection, id: &OrderId) -> Result<Option<Order>, StoreError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
    let raw = conn
        .query_row(&sql, params![id.as_str()], read_order)
        .optional()?;
    raw.map(RawOrder::into_order).transpose()
}

#[async_trait]
impl IdentityStore for SqliteStore {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock().await;
        find_user_where(&conn, "id = ?1", id.as_str())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock().await;
        find_user_where(&conn, "email = ?1", email)
    }

    async fn find_user_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock().await;
        find_user_where(&conn, "google_id = ?1", google_id)
    }

    async fn find_user_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock().await;
        find_user_where(&conn, "verification_token = ?1", token)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
            .query_map([], read_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawUser::into_user).collect()
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let profile_image = encode_profile_image(user)?;
        let order_ids = serde_json::to_string(&user.order_ids)?;
        let created_at = user.created_at.to_rfc3339();
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, role, google_id, \
             profile_image, verified, verification_token, order_ids, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                user.id.as_str(),
                user.username,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.google_id,
                profile_image,
                user.verified,
                user.verification_token,
                order_ids,
                created_at,
            ],
        )?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let profile_image = encode_profile_image(user)?;
        let order_ids = serde_json::to_string(&user.order_ids)?;
        let created_at = user.created_at.to_rfc3339();
        conn.execute(
            "UPDATE users SET username = ?2, email = ?3, password_hash = ?4, role = ?5, \
             google_id = ?6, profile_image = ?7, verified = ?8, verification_token = ?9, \
             order_ids = ?10, created_at = ?11 WHERE id = ?1",
            params![
                user.id.as_str(),
                user.username,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.google_id,
                profile_image,
                user.verified,
                user.verification_token,
                order_ids,
                created_at,
            ],
        )?;
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id.as_str()])?;
        Ok(changed > 0)
    }
}

struct RawProduct {
    id: String,
    name: String,
    description: String,
    price: f64,
    category: String,
    images: String,
    created_at: String,
}

fn read_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProduct> {
    Ok(RawProduct {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        images: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl RawProduct {
    fn into_product(self) -> Result<Product, StoreError> {
        Ok(Product {
            id: ProductId::parse(&self.id).map_err(|e| StoreError::Encoding(e.to_string()))?,
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            images: serde_json::from_str(&self.images)?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, images, created_at";

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let raw = conn
            .query_row(&sql, params![id.as_str()], read_product)
            .optional()?;
        raw.map(RawProduct::into_product).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at");
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
            .query_map([], read_product)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawProduct::into_product).collect()
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO products (id, name, description, price, category, images, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                product.id.as_str(),
                product.name,
                product.description,
                product.price,
                product.category,
                serde_json::to_string(&product.images)?,
                product.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE products SET name = ?2, description = ?3, price = ?4, category = ?5, \
             images = ?6, created_at = ?7 WHERE id = ?1",
            params![
                product.id.as_str(),
                product.name,
                product.description,
                product.price,
                product.category,
                serde_json::to_string(&product.images)?,
                product.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let changed =
            conn.execute("DELETE FROM products WHERE id = ?1", params![id.as_str()])?;
        Ok(changed > 0)
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn persist_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().await;
        if self.atomic_history_append {
            let tx = conn.transaction()?;
            insert_order_row(&tx, order)?;
            append_history_row(&tx, order)?;
            tx.commit()?;
        } else {
            insert_order_row(&conn, order)?;
            if let Err(err) = append_history_row(&conn, order) {
                warn!(order = %order.id, "order stored but history append failed: {err}");
                return Err(err);
            }
        }
        Ok(())
    }

    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let conn = self.conn.lock().await;
        find_order_by_id(&conn, id)
    }

    async fn orders_for_user(&self, ids: &[OrderId]) -> Result<Vec<Order>, StoreError> {
        let conn = self.conn.lock().await;
        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(order) = find_order_by_id(&conn, id)? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY purchase_date DESC");
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
            .query_map([], read_order)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawOrder::into_order).collect()
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE orders SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id.as_str()],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        find_order_by_id(&conn, id)
    }

    async fn count_orders(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().await;
        let count: u64 =
            conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
        Ok(count)
    }
}
