use model::entities::prelude::*;
use sea_orm::entity::prelude::*;
use sea_orm::Iden;

/// Table and column identifiers taken from the entity definitions, so the
/// schema cannot drift from the model names.
pub trait EntityIden: EntityTrait {
    fn table() -> TableIden {
        TableIden(Self::default().table_name().to_string())
    }

    fn column<C: ColumnTrait + Iden>(column: C) -> ColumnIden {
        let mut s = String::new();
        column.unquoted(&mut s);
        ColumnIden(s)
    }
}

impl EntityIden for Company {}
impl EntityIden for Account {}
impl EntityIden for BalanceSheet {}
impl EntityIden for Balance {}
impl EntityIden for Transaction {}
impl EntityIden for CreditScore {}
impl EntityIden for Payment {}
impl EntityIden for Budget {}
impl EntityIden for LineItem {}
impl EntityIden for TaxReturn {}

#[derive(Debug, Clone)]
pub struct TableIden(String);

impl Iden for TableIden {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = s.write_str(&self.0);
    }
}

#[derive(Debug, Clone)]
pub struct ColumnIden(String);

impl Iden for ColumnIden {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = s.write_str(&self.0);
    }
}
