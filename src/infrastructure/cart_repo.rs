use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{Cart, CartId, CartLine, LineRemoval, LineSnapshot};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_lines, carts, products};

use super::models::{CartLineRow, CartRow, NewCartLineRow, NewCartRow};

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Lock the cart row for the rest of the transaction. Paid carts are
/// terminal, so they are reported exactly like missing ones.
fn lock_open_cart(conn: &mut PgConnection, cart_id: CartId) -> Result<(), DomainError> {
    carts::table
        .filter(carts::id.eq(cart_id))
        .filter(carts::paid.eq(false))
        .select(carts::id)
        .for_update()
        .first::<Uuid>(conn)
        .optional()?
        .map(|_| ())
        .ok_or(DomainError::CartNotFound)
}

fn load_lines(conn: &mut PgConnection, cart_id: CartId) -> Result<Vec<CartLine>, DomainError> {
    cart_lines::table
        .filter(cart_lines::cart_id.eq(cart_id))
        .order((cart_lines::created_at.asc(), cart_lines::product_model.asc()))
        .select(CartLineRow::as_select())
        .load(conn)?
        .into_iter()
        .map(CartLine::try_from)
        .collect()
}

fn attach_lines(conn: &mut PgConnection, rows: Vec<CartRow>) -> Result<Vec<Cart>, DomainError> {
    let lines = CartLineRow::belonging_to(&rows)
        .select(CartLineRow::as_select())
        .order((cart_lines::created_at.asc(), cart_lines::product_model.asc()))
        .load(conn)?;

    lines
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(lines, cart)| cart.into_cart(lines))
        .collect()
}

impl CartRepository for DieselCartRepository {
    fn open_cart_id(&self, customer: &str) -> Result<Option<CartId>, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(carts::table
            .filter(carts::customer.eq(customer))
            .filter(carts::paid.eq(false))
            .select(carts::id)
            .first::<Uuid>(&mut conn)
            .optional()?)
    }

    fn create_empty(&self, customer: &str) -> Result<CartId, DomainError> {
        let mut conn = self.pool.get()?;

        let id = Uuid::new_v4();
        let inserted = diesel::insert_into(carts::table)
            .values(&NewCartRow {
                id,
                customer: customer.to_string(),
                paid: false,
                total: BigDecimal::from(0),
            })
            .execute(&mut conn);

        match inserted {
            Ok(_) => Ok(id),
            // carts_one_open_per_customer
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(DomainError::CartAlreadyOpen)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        load_lines(&mut conn, cart_id)
    }

    fn add_unit(&self, cart_id: CartId, snapshot: &LineSnapshot) -> Result<i32, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_open_cart(conn, cart_id)?;

            diesel::insert_into(cart_lines::table)
                .values(&NewCartLineRow {
                    cart_id,
                    product_model: snapshot.model.clone(),
                    quantity: 1,
                    category: snapshot.category.to_string(),
                    price: snapshot.price.clone(),
                })
                .on_conflict((cart_lines::cart_id, cart_lines::product_model))
                .do_update()
                .set(cart_lines::quantity.eq(cart_lines::quantity + 1))
                .returning(cart_lines::quantity)
                .get_result::<i32>(conn)
                .map_err(|e| match e {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        DomainError::ProductNotFound
                    }
                    other => other.into(),
                })
        })
    }

    fn remove_unit(&self, cart_id: CartId, model: &str) -> Result<LineRemoval, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_open_cart(conn, cart_id)?;

            let line = || cart_lines::table.find((cart_id, model));
            let quantity = line()
                .select(cart_lines::quantity)
                .for_update()
                .first::<i32>(conn)
                .optional()?;

            match quantity {
                None => Err(DomainError::ProductNotInCart),
                Some(q) if q > 1 => {
                    diesel::update(line())
                        .set(cart_lines::quantity.eq(cart_lines::quantity - 1))
                        .execute(conn)?;
                    Ok(LineRemoval::Decremented { remaining: q - 1 })
                }
                Some(_) => {
                    diesel::delete(line()).execute(conn)?;
                    Ok(LineRemoval::Removed)
                }
            }
        })
    }

    fn clear(&self, cart_id: CartId) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_open_cart(conn, cart_id)?;

            Ok(diesel::delete(cart_lines::table.filter(cart_lines::cart_id.eq(cart_id)))
                .execute(conn)?)
        })
    }

    fn commit_checkout(
        &self,
        cart_id: CartId,
        lines: &[CartLine],
        total: &BigDecimal,
        paid_on: NaiveDate,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock the cart so no line can change underneath the commit.
            lock_open_cart(conn, cart_id)?;
            if load_lines(conn, cart_id)? != lines {
                return Err(DomainError::CartChanged);
            }

            // 2. Take every line out of stock; any shortfall aborts the whole commit.
            // Product rows are locked in model order so concurrent checkouts
            // over the same products cannot deadlock.
            let mut ordered: Vec<&CartLine> = lines.iter().collect();
            ordered.sort_by(|a, b| a.model.cmp(&b.model));
            for line in ordered {
                let updated = diesel::update(
                    products::table
                        .filter(products::model.eq(&line.model))
                        .filter(products::quantity.ge(line.quantity)),
                )
                .set(products::quantity.eq(products::quantity - line.quantity))
                .execute(conn)?;

                if updated == 0 {
                    return Err(DomainError::LowStock);
                }
            }

            // 3. Close the cart.
            diesel::update(carts::table.find(cart_id))
                .set((
                    carts::paid.eq(true),
                    carts::payment_date.eq(Some(paid_on)),
                    carts::total.eq(total.clone()),
                ))
                .execute(conn)?;

            Ok(())
        })
    }

    fn paid_carts(&self, customer: &str) -> Result<Vec<Cart>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = carts::table
            .filter(carts::customer.eq(customer))
            .filter(carts::paid.eq(true))
            .order(carts::created_at.asc())
            .select(CartRow::as_select())
            .load(&mut conn)?;

        attach_lines(&mut conn, rows)
    }

    fn all_carts(&self) -> Result<Vec<Cart>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = carts::table
            .order(carts::created_at.asc())
            .select(CartRow::as_select())
            .load(&mut conn)?;

        attach_lines(&mut conn, rows)
    }

    fn delete_all(&self) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        // Lines go with their carts (ON DELETE CASCADE).
        Ok(diesel::delete(carts::table).execute(&mut conn)?)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    use super::DieselCartRepository;
    use crate::domain::cart::{LineRemoval, LineSnapshot};
    use crate::domain::errors::DomainError;
    use crate::domain::ports::{CartRepository, InventoryRepository};
    use crate::domain::product::{Category, NewProduct};
    use crate::infrastructure::product_repo::DieselInventoryRepository;
    use crate::infrastructure::test_db::setup_db;

    fn laptop(model: &str, quantity: i32, price: &str) -> NewProduct {
        NewProduct {
            model: model.to_string(),
            category: Category::Laptop,
            quantity,
            selling_price: BigDecimal::from_str(price).expect("valid decimal"),
            arrival_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            details: None,
        }
    }

    fn snapshot(model: &str, price: &str) -> LineSnapshot {
        LineSnapshot {
            model: model.to_string(),
            category: Category::Laptop,
            price: BigDecimal::from_str(price).expect("valid decimal"),
        }
    }

    fn paid_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn second_open_cart_for_customer_is_rejected() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool);

        let first = carts.create_empty("alice").expect("create failed");
        let second = carts.create_empty("alice");

        assert!(matches!(second, Err(DomainError::CartAlreadyOpen)));
        assert_eq!(carts.open_cart_id("alice").expect("lookup failed"), Some(first));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn adding_a_model_twice_increments_one_line() {
        let (_container, pool) = setup_db().await;
        let inventory = DieselInventoryRepository::new(pool.clone());
        let carts = DieselCartRepository::new(pool);
        inventory.insert(laptop("XPS 13", 5, "1200.00")).expect("insert failed");
        let cart_id = carts.create_empty("bob").expect("create failed");

        carts.add_unit(cart_id, &snapshot("XPS 13", "1200.00")).expect("add failed");
        let quantity = carts.add_unit(cart_id, &snapshot("XPS 13", "1200.00")).expect("add failed");

        let lines = carts.lines(cart_id).expect("lines failed");
        assert_eq!(quantity, 2);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn removing_the_last_unit_deletes_the_line() {
        let (_container, pool) = setup_db().await;
        let inventory = DieselInventoryRepository::new(pool.clone());
        let carts = DieselCartRepository::new(pool);
        inventory.insert(laptop("ThinkPad X1", 5, "1500.00")).expect("insert failed");
        let cart_id = carts.create_empty("carol").expect("create failed");
        carts.add_unit(cart_id, &snapshot("ThinkPad X1", "1500.00")).expect("add failed");
        carts.add_unit(cart_id, &snapshot("ThinkPad X1", "1500.00")).expect("add failed");

        assert_eq!(
            carts.remove_unit(cart_id, "ThinkPad X1").expect("remove failed"),
            LineRemoval::Decremented { remaining: 1 }
        );
        assert_eq!(
            carts.remove_unit(cart_id, "ThinkPad X1").expect("remove failed"),
            LineRemoval::Removed
        );
        assert!(matches!(
            carts.remove_unit(cart_id, "ThinkPad X1"),
            Err(DomainError::ProductNotInCart)
        ));
        // The emptied cart itself stays open.
        assert_eq!(carts.open_cart_id("carol").expect("lookup failed"), Some(cart_id));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn commit_checkout_is_all_or_nothing() {
        let (_container, pool) = setup_db().await;
        let inventory = DieselInventoryRepository::new(pool.clone());
        let carts = DieselCartRepository::new(pool);
        inventory.insert(laptop("A", 10, "5.00")).expect("insert failed");
        inventory.insert(laptop("B", 1, "7.00")).expect("insert failed");
        let cart_id = carts.create_empty("dave").expect("create failed");
        carts.add_unit(cart_id, &snapshot("A", "5.00")).expect("add failed");
        carts.add_unit(cart_id, &snapshot("B", "7.00")).expect("add failed");
        carts.add_unit(cart_id, &snapshot("B", "7.00")).expect("add failed");
        let lines = carts.lines(cart_id).expect("lines failed");

        let total = BigDecimal::from_str("19.00").expect("valid decimal");
        let result = carts.commit_checkout(cart_id, &lines, &total, paid_on());

        assert!(matches!(result, Err(DomainError::LowStock)));
        let a = inventory.find("A").expect("find failed").expect("A exists");
        assert_eq!(a.quantity, 10, "first line must be rolled back");
        assert_eq!(carts.open_cart_id("dave").expect("lookup failed"), Some(cart_id));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn commit_checkout_marks_cart_paid() {
        let (_container, pool) = setup_db().await;
        let inventory = DieselInventoryRepository::new(pool.clone());
        let carts = DieselCartRepository::new(pool);
        inventory.insert(laptop("A", 10, "5.00")).expect("insert failed");
        let cart_id = carts.create_empty("erin").expect("create failed");
        for _ in 0..3 {
            carts.add_unit(cart_id, &snapshot("A", "5.00")).expect("add failed");
        }
        let lines = carts.lines(cart_id).expect("lines failed");
        let total = BigDecimal::from_str("15.00").expect("valid decimal");

        carts
            .commit_checkout(cart_id, &lines, &total, paid_on())
            .expect("checkout failed");

        let a = inventory.find("A").expect("find failed").expect("A exists");
        assert_eq!(a.quantity, 7);
        assert_eq!(carts.open_cart_id("erin").expect("lookup failed"), None);

        let paid = carts.paid_carts("erin").expect("paid carts failed");
        assert_eq!(paid.len(), 1);
        assert!(paid[0].paid);
        assert_eq!(paid[0].payment_date, Some(paid_on()));
        assert_eq!(paid[0].total, total);
        assert_eq!(paid[0].lines.len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn crossed_checkouts_over_the_same_products_both_commit() {
        let (_container, pool) = setup_db().await;
        let inventory = DieselInventoryRepository::new(pool.clone());
        let carts = Arc::new(DieselCartRepository::new(pool));
        inventory.insert(laptop("A", 100, "5.00")).expect("insert failed");
        inventory.insert(laptop("B", 100, "7.00")).expect("insert failed");

        // Half the carts list A before B, the other half B before A.
        let mut checkouts = Vec::new();
        for i in 0..8 {
            let customer = format!("buyer-{i}");
            let cart_id = carts.create_empty(&customer).expect("create failed");
            let order = if i % 2 == 0 { ["A", "B"] } else { ["B", "A"] };
            for model in order {
                let price = if model == "A" { "5.00" } else { "7.00" };
                carts.add_unit(cart_id, &snapshot(model, price)).expect("add failed");
            }
            let lines = carts.lines(cart_id).expect("lines failed");
            checkouts.push((cart_id, lines));
        }

        let handles: Vec<_> = checkouts
            .into_iter()
            .map(|(cart_id, lines)| {
                let carts = Arc::clone(&carts);
                std::thread::spawn(move || {
                    let total = BigDecimal::from_str("12.00").expect("valid decimal");
                    carts.commit_checkout(cart_id, &lines, &total, paid_on())
                })
            })
            .collect();

        for handle in handles {
            let result = handle.join().expect("checkout thread panicked");
            assert!(result.is_ok(), "checkout failed: {result:?}");
        }
        assert_eq!(inventory.find("A").expect("find failed").map(|p| p.quantity), Some(92));
        assert_eq!(inventory.find("B").expect("find failed").map(|p| p.quantity), Some(92));
    }
}
