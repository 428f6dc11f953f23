use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
	Result,
	postgres::{PgLocationStore, PgPlacementStore, PgThingStore},
	schema,
};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &shelf_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 7_350_113;
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}

	pub fn location_store(&self) -> PgLocationStore {
		PgLocationStore { pool: self.pool.clone() }
	}

	pub fn placement_store(&self) -> PgPlacementStore {
		PgPlacementStore { pool: self.pool.clone() }
	}

	pub fn thing_store(&self) -> PgThingStore {
		PgThingStore { pool: self.pool.clone() }
	}
}
