use chrono::{Datelike, NaiveDate};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_service_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("service_name required".into()));
    }
    Ok(())
}

pub fn validate_price(price: i32) -> Result<(), errors::ModelError> {
    if price < 0 {
        return Err(errors::ModelError::Validation("price must be >= 0".into()));
    }
    Ok(())
}

pub fn parse_user_id(raw: &str) -> Result<Uuid, errors::ModelError> {
    Uuid::parse_str(raw.trim()).map_err(|_| errors::ModelError::Validation("user_id must be uuid".into()))
}

/// Parse `MM-YYYY` into the first day of that month.
pub fn parse_month_year(raw: &str) -> Result<NaiveDate, errors::ModelError> {
    let invalid = || errors::ModelError::Validation(format!("'{}' must be MM-YYYY", raw));
    let (month, year) = raw.trim().split_once('-').ok_or_else(invalid)?;
    if month.len() != 2 || year.len() != 4 {
        return Err(invalid());
    }
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Clamp any date to the first day of its month.
pub fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}
