use diesel::{deserialize::FromSqlRow, expression::AsExpression};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Users are owned by the identity provider; only their ids are stored here.
#[derive(
    Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq, PartialOrd, Ord, FromSqlRow, AsExpression,
)]
#[diesel(sql_type = diesel::sql_types::Uuid)]
pub struct Id(Uuid);

market_messenger::sql_uuid!(Id);
