pub trait Raw {
    fn raw(&self) -> &str;
}

/// Masks secrets before they end up in logs, keeping a short prefix and suffix
/// so that two values can still be told apart.
pub trait Redact: Raw {
    fn redact(&self) -> String {
        let raw = self.raw();
        let len = raw.chars().count();

        if len <= 8 {
            return "*".repeat(len);
        }

        let head: String = raw.chars().take(4).collect();
        let tail: String = raw.chars().skip(len - 4).collect();
        format!("{head}...{tail}")
    }
}

/// Implements diesel's postgres `Uuid` conversions for a newtype over [`uuid::Uuid`].
///
/// The type must also derive `AsExpression` and `FromSqlRow` with
/// `#[diesel(sql_type = diesel::sql_types::Uuid)]`.
#[macro_export]
macro_rules! sql_uuid {
    ($ty:ident) => {
        impl ::diesel::serialize::ToSql<::diesel::sql_types::Uuid, ::diesel::pg::Pg> for $ty {
            fn to_sql<'b>(
                &'b self,
                out: &mut ::diesel::serialize::Output<'b, '_, ::diesel::pg::Pg>,
            ) -> ::diesel::serialize::Result {
                <::uuid::Uuid as ::diesel::serialize::ToSql<
                    ::diesel::sql_types::Uuid,
                    ::diesel::pg::Pg,
                >>::to_sql(&self.0, out)
            }
        }

        impl ::diesel::deserialize::FromSql<::diesel::sql_types::Uuid, ::diesel::pg::Pg> for $ty {
            fn from_sql(bytes: ::diesel::pg::PgValue<'_>) -> ::diesel::deserialize::Result<Self> {
                <::uuid::Uuid as ::diesel::deserialize::FromSql<
                    ::diesel::sql_types::Uuid,
                    ::diesel::pg::Pg,
                >>::from_sql(bytes)
                .map(Self)
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<::uuid::Uuid> for $ty {
            fn from(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}
