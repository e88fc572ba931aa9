//! `SeaORM` Entity for currencies table.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tillpoint_core::currency::Currency;
use tillpoint_shared::CurrencyId;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub symbol: String,
    #[sea_orm(column_type = "Decimal(None)")]
    pub exchange_rate: Decimal,
    pub is_default: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Currency {
    fn from(model: Model) -> Self {
        Self {
            id: CurrencyId::from_uuid(model.id),
            name: model.name,
            code: model.code,
            symbol: model.symbol,
            exchange_rate: model.exchange_rate,
            is_default: model.is_default,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<&Currency> for ActiveModel {
    fn from(currency: &Currency) -> Self {
        Self {
            id: Set(currency.id.into_inner()),
            name: Set(currency.name.clone()),
            code: Set(currency.code.clone()),
            symbol: Set(currency.symbol.clone()),
            exchange_rate: Set(currency.exchange_rate),
            is_default: Set(currency.is_default),
            created_at: Set(currency.created_at.fixed_offset()),
            updated_at: Set(currency.updated_at.fixed_offset()),
        }
    }
}
