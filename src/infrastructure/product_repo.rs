use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::InventoryRepository;
use crate::domain::product::{NewProduct, Product};
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};

pub struct DieselInventoryRepository {
    pool: DbPool,
}

impl DieselInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl InventoryRepository for DieselInventoryRepository {
    fn find(&self, model: &str) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        products::table
            .find(model)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn insert(&self, product: NewProduct) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        match diesel::insert_into(products::table)
            .values(&NewProductRow::from(product))
            .execute(&mut conn)
        {
            Ok(_) => Ok(()),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(DomainError::ProductAlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set_quantity(&self, model: &str, quantity: i32) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(diesel::update(products::table.find(model))
            .set(products::quantity.eq(quantity))
            .execute(&mut conn)?)
    }

    fn decrement_if_available(&self, model: &str, amount: i32) -> Result<Option<i32>, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(diesel::update(
            products::table
                .filter(products::model.eq(model))
                .filter(products::quantity.ge(amount)),
        )
        .set(products::quantity.eq(products::quantity - amount))
        .returning(products::quantity)
        .get_result::<i32>(&mut conn)
        .optional()?)
    }

    fn delete(&self, model: &str) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::delete(products::table.find(model))
            .execute(&mut conn)
            .map_err(in_use_or_storage)
    }

    fn delete_all(&self) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::delete(products::table)
            .execute(&mut conn)
            .map_err(in_use_or_storage)
    }
}

fn in_use_or_storage(e: DieselError) -> DomainError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            DomainError::ProductInUse
        }
        other => other.into(),
    }
}
