//! [`SqliteStore`]: the SQLite implementation of every repository trait.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior, types::Value};
use uuid::Uuid;

use propusk_core::{
  building::Building,
  filter::PassFilter,
  pass::{Pass, PassItem, PassItemDetails, PassShort, PassStatus, PassSummary, StatusChange},
  store::{
    BuildingRepository, PassItemRepository, PassRepository, StoreResult, UserRepository,
  },
  user::User,
};

use crate::{
  encode::{
    BUILDING_COLUMNS, PASS_COLUMNS, RawBuilding, RawItem, RawItemDetails, RawPass,
    RawSummary, RawUser, decode_status, decode_uuid, encode_dt, encode_status,
    encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A pass store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Run `f` on the connection thread.
  async fn call<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    Ok(self.conn.call(f).await?)
  }

  /// Run a write statement and fail with [`Error::NotFound`] if it touched no
  /// row.
  async fn execute_one(&self, sql: &'static str, args: Vec<Value>) -> Result<()> {
    let changed = self
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(args))?))
      .await?;
    if changed == 0 {
      return Err(Error::NotFound);
    }
    Ok(())
  }

  async fn list_passes(
    &self,
    creator_id: Option<Uuid>,
    filter: PassFilter,
  ) -> Result<Vec<PassSummary>> {
    let mut args: Vec<Value> = Vec::new();
    let mut conds: Vec<String> = Vec::new();

    let marks: Vec<String> = filter
      .statuses()
      .into_iter()
      .map(|s| {
        args.push(Value::Integer(encode_status(s)));
        format!("?{}", args.len())
      })
      .collect();
    conds.push(format!("p.status IN ({})", marks.join(", ")));

    if let Some(creator) = creator_id {
      args.push(Value::Text(encode_uuid(creator)));
      conds.push(format!("p.creator_id = ?{}", args.len()));
    }
    if let Some(from) = filter.from {
      args.push(Value::Text(encode_dt(from)));
      conds.push(format!("p.visit_date >= ?{}", args.len()));
    }
    if let Some(to) = filter.to {
      args.push(Value::Text(encode_dt(to)));
      conds.push(format!("p.visit_date <= ?{}", args.len()));
    }

    let sql = format!(
      "SELECT {PASS_COLUMNS}, COALESCE(u.login, '')
       FROM passes p
       LEFT JOIN users u ON u.user_id = p.creator_id
       WHERE {}
       ORDER BY p.created_at",
      conds.join(" AND ")
    );

    let raws: Vec<RawSummary> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawSummary::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  async fn query_buildings(
    &self,
    sql: String,
    args: Vec<Value>,
  ) -> Result<Vec<Building>> {
    let raws: Vec<RawBuilding> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawBuilding::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBuilding::into_building).collect()
  }
}

fn insert_pass(conn: &rusqlite::Connection, pass: &Pass) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO passes (
       pass_id, creator_id, moderator_id, status, visitor,
       visit_date, created_at, formed_at, completed_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    rusqlite::params![
      encode_uuid(pass.id),
      encode_uuid(pass.creator_id),
      pass.moderator_id.map(encode_uuid),
      encode_status(pass.status),
      pass.visitor_name,
      pass.visit_date.map(encode_dt),
      encode_dt(pass.created_at),
      pass.formed_at.map(encode_dt),
      pass.completed_at.map(encode_dt),
    ],
  )?;
  Ok(())
}

/// Outcome of a conditional status write.
enum Applied {
  Done,
  Missing,
  Stale,
}

impl Applied {
  fn into_result(self) -> Result<()> {
    match self {
      Applied::Done => Ok(()),
      Applied::Missing => Err(Error::NotFound),
      Applied::Stale => Err(Error::StatusChanged),
    }
  }
}

/// Write `change` only if the pass is still in `change.from`.
fn apply_status(
  conn: &rusqlite::Connection,
  id: &str,
  change: &StatusChange,
) -> rusqlite::Result<Applied> {
  let at = encode_dt(change.at);
  let (formed_at, completed_at) = match change.status {
    PassStatus::Formed => (Some(at), None),
    PassStatus::Completed | PassStatus::Rejected => (None, Some(at)),
    PassStatus::Draft | PassStatus::Deleted => (None, None),
  };

  let changed = conn.execute(
    "UPDATE passes SET
       status       = ?2,
       moderator_id = COALESCE(?3, moderator_id),
       formed_at    = COALESCE(?4, formed_at),
       completed_at = COALESCE(?5, completed_at)
     WHERE pass_id = ?1 AND status = ?6",
    rusqlite::params![
      id,
      encode_status(change.status),
      change.moderator_id.map(encode_uuid),
      formed_at,
      completed_at,
      encode_status(change.from),
    ],
  )?;
  if changed > 0 {
    return Ok(Applied::Done);
  }

  let exists = conn
    .query_row(
      "SELECT 1 FROM passes WHERE pass_id = ?1",
      rusqlite::params![id],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  Ok(if exists { Applied::Stale } else { Applied::Missing })
}

// ─── PassRepository ──────────────────────────────────────────────────────────

impl PassRepository for SqliteStore {
  async fn find_draft_by_creator(&self, creator_id: Uuid) -> StoreResult<Uuid> {
    let creator = encode_uuid(creator_id);
    let id: Option<String> = self
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT pass_id FROM passes WHERE creator_id = ?1 AND status = ?2",
            rusqlite::params![creator, encode_status(PassStatus::Draft)],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    let id = id.ok_or(Error::NotFound)?;
    Ok(decode_uuid(&id)?)
  }

  async fn find_or_create_draft(&self, creator_id: Uuid) -> StoreResult<(Uuid, bool)> {
    let fresh = Pass::draft(creator_id);
    let creator = encode_uuid(creator_id);

    let (id, created): (String, bool) = self
      .call(move |conn| {
        // IMMEDIATE takes the write lock before the read, so no other
        // writer can slip a draft in between.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing: Option<String> = tx
          .query_row(
            "SELECT pass_id FROM passes WHERE creator_id = ?1 AND status = ?2",
            rusqlite::params![creator, encode_status(PassStatus::Draft)],
            |r| r.get(0),
          )
          .optional()?;

        let result = match existing {
          Some(id) => (id, false),
          None => {
            insert_pass(&tx, &fresh)?;
            (encode_uuid(fresh.id), true)
          }
        };
        tx.commit()?;
        Ok(result)
      })
      .await?;

    if created {
      tracing::debug!(%creator_id, pass_id = %id, "created draft pass");
    }
    Ok((decode_uuid(&id)?, created))
  }

  async fn create(&self, pass: Pass) -> StoreResult<()> {
    self.call(move |conn| Ok(insert_pass(conn, &pass)?)).await?;
    Ok(())
  }

  async fn load(&self, id: Uuid) -> StoreResult<Pass> {
    let id_str = encode_uuid(id);
    let raw: Option<RawPass> = self
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PASS_COLUMNS} FROM passes p WHERE p.pass_id = ?1"),
            rusqlite::params![id_str],
            RawPass::from_row,
          )
          .optional()?)
      })
      .await?;

    Ok(raw.ok_or(Error::NotFound)?.into_pass()?)
  }

  async fn load_short(&self, id: Uuid) -> StoreResult<PassShort> {
    let id_str = encode_uuid(id);
    let row: Option<(i64, String)> = self
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT status, creator_id FROM passes WHERE pass_id = ?1",
            rusqlite::params![id_str],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?)
      })
      .await?;

    let (status, creator) = row.ok_or(Error::NotFound)?;
    Ok(PassShort {
      id,
      status:     decode_status(status)?,
      creator_id: decode_uuid(&creator)?,
    })
  }

  async fn update_status(&self, id: Uuid, change: StatusChange) -> StoreResult<()> {
    let id_str = encode_uuid(id);
    let applied = self
      .call(move |conn| Ok(apply_status(conn, &id_str, &change)?))
      .await?;
    Ok(applied.into_result()?)
  }

  async fn moderate(&self, id: Uuid, change: StatusChange) -> StoreResult<()> {
    let id_str = encode_uuid(id);
    let applied = self
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let applied = apply_status(&tx, &id_str, &change)?;
        if let Applied::Done = applied {
          tx.execute(
            "UPDATE pass_items SET was_visited = 1 WHERE pass_id = ?1",
            rusqlite::params![id_str],
          )?;
          tx.commit()?;
        }
        Ok(applied)
      })
      .await?;
    Ok(applied.into_result()?)
  }

  async fn update_visitor_info(
    &self,
    id: Uuid,
    visitor_name: String,
    visit_date: Option<DateTime<Utc>>,
  ) -> StoreResult<()> {
    self
      .execute_one(
        "UPDATE passes SET visitor = ?2, visit_date = ?3 WHERE pass_id = ?1",
        vec![
          Value::Text(encode_uuid(id)),
          Value::Text(visitor_name),
          visit_date.map(encode_dt).map_or(Value::Null, Value::Text),
        ],
      )
      .await?;
    Ok(())
  }

  async fn list_all(&self, filter: PassFilter) -> StoreResult<Vec<PassSummary>> {
    Ok(self.list_passes(None, filter).await?)
  }

  async fn list_for_creator(
    &self,
    creator_id: Uuid,
    filter: PassFilter,
  ) -> StoreResult<Vec<PassSummary>> {
    Ok(self.list_passes(Some(creator_id), filter).await?)
  }
}

// ─── PassItemRepository ──────────────────────────────────────────────────────

impl PassItemRepository for SqliteStore {
  async fn add(&self, pass_id: Uuid, building_id: Uuid, comment: String) -> StoreResult<()> {
    let pass = encode_uuid(pass_id);
    let building = encode_uuid(building_id);
    self
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pass_items (pass_id, building_id, comment) VALUES (?1, ?2, ?3)",
          rusqlite::params![pass, building, comment],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove(&self, pass_id: Uuid, building_id: Uuid) -> StoreResult<()> {
    self
      .execute_one(
        "DELETE FROM pass_items WHERE pass_id = ?1 AND building_id = ?2",
        vec![
          Value::Text(encode_uuid(pass_id)),
          Value::Text(encode_uuid(building_id)),
        ],
      )
      .await?;
    Ok(())
  }

  async fn edit_comment(
    &self,
    pass_id: Uuid,
    building_id: Uuid,
    comment: String,
  ) -> StoreResult<()> {
    self
      .execute_one(
        "UPDATE pass_items SET comment = ?3 WHERE pass_id = ?1 AND building_id = ?2",
        vec![
          Value::Text(encode_uuid(pass_id)),
          Value::Text(encode_uuid(building_id)),
          Value::Text(comment),
        ],
      )
      .await?;
    Ok(())
  }

  async fn mark_all_visited(&self, pass_id: Uuid) -> StoreResult<()> {
    let pass = encode_uuid(pass_id);
    self
      .call(move |conn| {
        conn.execute(
          "UPDATE pass_items SET was_visited = 1 WHERE pass_id = ?1",
          rusqlite::params![pass],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list(&self, pass_id: Uuid) -> StoreResult<Vec<PassItem>> {
    let pass = encode_uuid(pass_id);
    let raws: Vec<RawItem> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT pass_id, building_id, comment, was_visited
           FROM pass_items WHERE pass_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![pass], |row| {
            Ok(RawItem {
              pass_id:     row.get(0)?,
              building_id: row.get(1)?,
              comment:     row.get(2)?,
              was_visited: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawItem::into_item).collect::<Result<_>>()?)
  }

  async fn list_details(&self, pass_id: Uuid) -> StoreResult<Vec<PassItemDetails>> {
    let pass = encode_uuid(pass_id);
    let raws: Vec<RawItemDetails> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT b.building_id, b.name, b.description, b.image_url,
                  i.comment, i.was_visited
           FROM pass_items i
           JOIN buildings b ON b.building_id = i.building_id
           WHERE i.pass_id = ?1
           ORDER BY i.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![pass], |row| {
            Ok(RawItemDetails {
              building_id: row.get(0)?,
              name:        row.get(1)?,
              description: row.get(2)?,
              image_url:   row.get(3)?,
              comment:     row.get(4)?,
              was_visited: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      raws
        .into_iter()
        .map(RawItemDetails::into_details)
        .collect::<Result<_>>()?,
    )
  }

  async fn count(&self, pass_id: Uuid) -> StoreResult<usize> {
    let pass = encode_uuid(pass_id);
    let n: i64 = self
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM pass_items WHERE pass_id = ?1",
          rusqlite::params![pass],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(usize::try_from(n).unwrap_or(0))
  }
}

// ─── BuildingRepository ──────────────────────────────────────────────────────

impl BuildingRepository for SqliteStore {
  async fn get(&self, id: Uuid) -> StoreResult<Building> {
    let mut found = self
      .query_buildings(
        format!("SELECT {BUILDING_COLUMNS} FROM buildings WHERE building_id = ?1"),
        vec![Value::Text(encode_uuid(id))],
      )
      .await?;
    Ok(found.pop().ok_or(Error::NotFound)?)
  }

  async fn list_active(&self) -> StoreResult<Vec<Building>> {
    Ok(
      self
        .query_buildings(
          format!("SELECT {BUILDING_COLUMNS} FROM buildings WHERE active = 1 ORDER BY name"),
          vec![],
        )
        .await?,
    )
  }

  async fn search(&self, pattern: String) -> StoreResult<Vec<Building>> {
    // instr() rather than LIKE so `%` and `_` in the pattern match literally.
    Ok(
      self
        .query_buildings(
          format!(
            "SELECT {BUILDING_COLUMNS} FROM buildings
             WHERE active = 1 AND instr(lower(name), lower(?1)) > 0
             ORDER BY name"
          ),
          vec![Value::Text(pattern)],
        )
        .await?,
    )
  }

  async fn save(&self, building: Building) -> StoreResult<()> {
    self
      .call(move |conn| {
        conn.execute(
          "INSERT INTO buildings (building_id, name, description, image_url, active)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            encode_uuid(building.id),
            building.name,
            building.description,
            building.image_url,
            building.active,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_info(&self, id: Uuid, name: String, description: String) -> StoreResult<()> {
    self
      .execute_one(
        "UPDATE buildings SET name = ?2, description = ?3 WHERE building_id = ?1",
        vec![Value::Text(encode_uuid(id)), Value::Text(name), Value::Text(description)],
      )
      .await?;
    Ok(())
  }

  async fn set_active(&self, id: Uuid, active: bool) -> StoreResult<()> {
    self
      .execute_one(
        "UPDATE buildings SET
           active    = ?2,
           image_url = CASE WHEN ?2 = 1 THEN image_url ELSE '' END
         WHERE building_id = ?1",
        vec![Value::Text(encode_uuid(id)), Value::Integer(i64::from(active))],
      )
      .await?;
    Ok(())
  }

  async fn set_image_url(&self, id: Uuid, url: String) -> StoreResult<()> {
    self
      .execute_one(
        "UPDATE buildings SET image_url = ?2 WHERE building_id = ?1",
        vec![Value::Text(encode_uuid(id)), Value::Text(url)],
      )
      .await?;
    Ok(())
  }
}

// ─── UserRepository ──────────────────────────────────────────────────────────

impl UserRepository for SqliteStore {
  async fn find_by_login(&self, login: String) -> StoreResult<User> {
    let raw: Option<RawUser> = self
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, login, pass_hash, is_admin, created_at
             FROM users WHERE login = ?1",
            rusqlite::params![login],
            |row| {
              Ok(RawUser {
                user_id:    row.get(0)?,
                login:      row.get(1)?,
                pass_hash:  row.get(2)?,
                is_admin:   row.get(3)?,
                created_at: row.get(4)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    Ok(raw.ok_or(Error::NotFound)?.into_user()?)
  }

  async fn insert_user(&self, user: User) -> StoreResult<()> {
    self
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, login, pass_hash, is_admin, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            encode_uuid(user.id),
            user.login,
            user.password_hash,
            user.is_admin,
            encode_dt(user.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_user(&self, id: Uuid, login: String, password_hash: String) -> StoreResult<()> {
    self
      .execute_one(
        "UPDATE users SET login = ?2, pass_hash = ?3 WHERE user_id = ?1",
        vec![
          Value::Text(encode_uuid(id)),
          Value::Text(login),
          Value::Text(password_hash),
        ],
      )
      .await?;
    Ok(())
  }
}
