use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

use super::company;

/// The type of an account, stored as a two letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(2))")]
pub enum AccountType {
    #[sea_orm(string_value = "Ca")]
    Cash,
    #[sea_orm(string_value = "Cc")]
    Credit,
    #[sea_orm(string_value = "Ln")]
    Loan,
    #[sea_orm(string_value = "Iv")]
    Investment,
    #[sea_orm(string_value = "Is")]
    Insurance,
    #[sea_orm(string_value = "Bl")]
    Billing,
    #[sea_orm(string_value = "Ch")]
    Charitable,
}

/// Which side of the household balance an account type falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountClass {
    Asset,
    Liability,
    /// Money sent here leaves the household, e.g. donations.
    Expense,
}

impl AccountType {
    /// The single classification table for account types.
    pub fn class(self) -> AccountClass {
        match self {
            AccountType::Cash => AccountClass::Asset,
            AccountType::Investment => AccountClass::Asset,
            AccountType::Insurance => AccountClass::Asset,
            AccountType::Credit => AccountClass::Liability,
            AccountType::Loan => AccountClass::Liability,
            AccountType::Billing => AccountClass::Liability,
            AccountType::Charitable => AccountClass::Expense,
        }
    }

    pub fn is_asset(self) -> bool {
        self.class() == AccountClass::Asset
    }

    pub fn is_liability(self) -> bool {
        self.class() == AccountClass::Liability
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            AccountType::Cash => "Cash",
            AccountType::Credit => "Credit Card",
            AccountType::Loan => "Loan",
            AccountType::Investment => "Investment",
            AccountType::Insurance => "Insurance",
            AccountType::Billing => "Billing",
            AccountType::Charitable => "Charitable",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for AccountType {
    type Err = String;

    /// Accepts either the variant name ("Credit") or the stored code ("Cc").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" | "Ca" => Ok(AccountType::Cash),
            "Credit" | "Cc" => Ok(AccountType::Credit),
            "Loan" | "Ln" => Ok(AccountType::Loan),
            "Investment" | "Iv" => Ok(AccountType::Investment),
            "Insurance" | "Is" => Ok(AccountType::Insurance),
            "Billing" | "Bl" => Ok(AccountType::Billing),
            "Charitable" | "Ch" => Ok(AccountType::Charitable),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

/// A financial account held at a company: cash, credit card, loan and so on.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub account_type: AccountType,
    /// Nickname, unique within the company.
    pub name: String,
    pub company_id: i32,
    /// Account number assigned by the company.
    pub number: Option<String>,
    #[sea_orm(default_value = "true")]
    pub active: bool,
    /// Excluded accounts are left out of sheet totals.
    #[sea_orm(default_value = "false")]
    pub exclude: bool,
    pub display_order: Option<i32>,
    pub opened_on: Option<NaiveDate>,
    pub closed_on: Option<NaiveDate>,
    /// ISO 4217 currency code, e.g. "USD".
    pub currency: String,
}

impl Model {
    pub fn is_asset(&self) -> bool {
        self.account_type.is_asset()
    }

    pub fn is_liability(&self) -> bool {
        self.account_type.is_liability()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "company::Entity",
        from = "Column::CompanyId",
        to = "company::Column::Id",
        on_delete = "Cascade"
    )]
    Company,
    #[sea_orm(has_many = "super::balance::Entity")]
    Balance,
}

impl Related<company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Balance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
