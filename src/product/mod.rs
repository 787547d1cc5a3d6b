use diesel::{deserialize::FromSqlRow, expression::AsExpression};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Listing a conversation is scoped to. Products live in the catalog service.
#[derive(Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = diesel::sql_types::Uuid)]
pub struct Id(Uuid);

market_messenger::sql_uuid!(Id);
