//! Bundled company-specific catalog overrides.

use xbrl_core::{ConceptMapping, StatementCategory};

use crate::catalog::CatalogOverride;

/// Shopify (SHOP, CIK 0001594805).
///
/// Revenue moved from `SalesRevenueServicesNet` (through 2017) to the ASC 606
/// tag and then to `Revenues`. Segment revenue is reported under tags the
/// standard catalog does not carry.
#[must_use]
pub fn shopify() -> CatalogOverride {
    CatalogOverride::new()
        .replace(
            "revenue",
            [
                "Revenues",
                "RevenueFromContractWithCustomerExcludingAssessedTax",
                "SalesRevenueServicesNet",
            ],
        )
        .replace(
            "net_income",
            [
                "NetIncomeLoss",
                "NetIncomeLossAvailableToCommonStockholdersBasic",
                "ProfitLoss",
            ],
        )
        .replace("capex", ["PaymentsToAcquirePropertyPlantAndEquipment"])
        .add(ConceptMapping::new(
            "subscription_revenue",
            "Subscription Solutions Revenue",
            "Revenue from subscription plans and apps",
            StatementCategory::IncomeStatement,
            ["LicenseAndServicesRevenue", "SubscriptionRevenue"],
        ))
        .add(ConceptMapping::new(
            "merchant_solutions_revenue",
            "Merchant Solutions Revenue",
            "Revenue from payments, shipping and capital",
            StatementCategory::IncomeStatement,
            ["RevenueNotFromContractWithCustomer"],
        ))
}
