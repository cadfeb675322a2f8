//! Tag catalog: concept key to ordered XBRL tags.
//!
//! Different companies, and the same company across years and accounting
//! standard changes, report one concept under different tags. The catalog
//! lists the candidates for each concept, most authoritative first.
//!
//! A [`TagCatalog`] is an immutable value. Company-specific knowledge goes
//! into a [`CatalogOverride`], which produces a new catalog and leaves the
//! base untouched.

use std::collections::BTreeMap;

use xbrl_core::StatementCategory::{BalanceSheet, CashFlow, IncomeStatement};
use xbrl_core::{ConceptMapping, Result, StatementCategory, XbrlError};

/// One row of the built-in table: key, display name, description, statement, tags.
type CatalogRow = (
    &'static str,
    &'static str,
    &'static str,
    StatementCategory,
    &'static [&'static str],
);

// =============================================================================
// Standard concepts
// =============================================================================

const STANDARD_CONCEPTS: &[CatalogRow] = &[
    // Income statement
    (
        "revenue",
        "Revenue",
        "Total revenue from all sources",
        IncomeStatement,
        &[
            // Current consolidated tags, then ASC 606 era, then pre-2018
            "Revenues",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
            "RevenueFromContractWithCustomerIncludingAssessedTax",
            "SalesRevenueNet",
            "SalesRevenueServicesNet",
            "SalesRevenueGoodsNet",
            "SalesRevenueServicesGross",
            "TotalRevenuesAndOtherIncome",
            "NetRevenues",
            // Banks
            "RevenuesNetOfInterestExpense",
        ],
    ),
    (
        "cost_of_revenue",
        "Cost of Revenue",
        "Direct costs of producing goods/services sold",
        IncomeStatement,
        &[
            "CostOfRevenue",
            "CostOfGoodsAndServicesSold",
            "CostOfGoodsSold",
            "CostOfServices",
        ],
    ),
    (
        "gross_profit",
        "Gross Profit",
        "Revenue minus cost of revenue",
        IncomeStatement,
        &["GrossProfit"],
    ),
    (
        "operating_expenses",
        "Operating Expenses",
        "Total operating expenses (R&D, SG&A, etc.)",
        IncomeStatement,
        &[
            "OperatingExpenses",
            "CostsAndExpenses",
            "OperatingCostsAndExpenses",
        ],
    ),
    (
        "research_and_development",
        "R&D Expense",
        "Research and development costs",
        IncomeStatement,
        &[
            "ResearchAndDevelopmentExpense",
            "ResearchAndDevelopmentExpenseExcludingAcquiredInProcessCost",
        ],
    ),
    (
        "sga_expense",
        "SG&A Expense",
        "Selling, general & administrative expenses",
        IncomeStatement,
        &[
            "SellingGeneralAndAdministrativeExpense",
            "SellingAndMarketingExpense",
            "GeneralAndAdministrativeExpense",
        ],
    ),
    (
        "operating_income",
        "Operating Income",
        "Profit from core operations (EBIT proxy)",
        IncomeStatement,
        &[
            "OperatingIncomeLoss",
            "IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
        ],
    ),
    (
        "net_income",
        "Net Income",
        "Bottom line profit attributable to shareholders",
        IncomeStatement,
        &[
            "NetIncomeLoss",
            "NetIncomeLossAvailableToCommonStockholdersBasic",
            "NetIncomeLossAttributableToParent",
            "ProfitLoss",
        ],
    ),
    (
        "eps_basic",
        "EPS (Basic)",
        "Earnings per share - basic",
        IncomeStatement,
        &["EarningsPerShareBasic"],
    ),
    (
        "eps_diluted",
        "EPS (Diluted)",
        "Earnings per share - diluted",
        IncomeStatement,
        &["EarningsPerShareDiluted"],
    ),
    (
        "shares_outstanding",
        "Shares Outstanding",
        "Weighted average shares outstanding",
        IncomeStatement,
        &[
            "WeightedAverageNumberOfSharesOutstandingBasic",
            "CommonStockSharesOutstanding",
            "WeightedAverageNumberOfDilutedSharesOutstanding",
        ],
    ),
    // Balance sheet
    (
        "total_assets",
        "Total Assets",
        "Sum of all assets",
        BalanceSheet,
        &["Assets"],
    ),
    (
        "current_assets",
        "Current Assets",
        "Assets expected to convert to cash within 1 year",
        BalanceSheet,
        &["AssetsCurrent"],
    ),
    (
        "cash",
        "Cash & Equivalents",
        "Cash and cash equivalents",
        BalanceSheet,
        &[
            "CashAndCashEquivalentsAtCarryingValue",
            "Cash",
            "CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalents",
        ],
    ),
    (
        "short_term_investments",
        "Short-Term Investments",
        "Marketable securities and short-term investments",
        BalanceSheet,
        &[
            "ShortTermInvestments",
            "MarketableSecuritiesCurrent",
            "AvailableForSaleSecuritiesDebtSecuritiesCurrent",
        ],
    ),
    (
        "accounts_receivable",
        "Accounts Receivable",
        "Money owed by customers",
        BalanceSheet,
        &[
            "AccountsReceivableNetCurrent",
            "AccountsReceivableNet",
            "ReceivablesNetCurrent",
        ],
    ),
    (
        "inventory",
        "Inventory",
        "Goods held for sale",
        BalanceSheet,
        &["InventoryNet", "Inventory", "InventoryFinishedGoods"],
    ),
    (
        "property_plant_equipment",
        "PP&E (Net)",
        "Property, plant & equipment net of depreciation",
        BalanceSheet,
        &["PropertyPlantAndEquipmentNet"],
    ),
    (
        "goodwill",
        "Goodwill",
        "Premium paid in acquisitions over fair value",
        BalanceSheet,
        &["Goodwill"],
    ),
    (
        "intangible_assets",
        "Intangible Assets",
        "Non-physical assets (patents, trademarks, etc.)",
        BalanceSheet,
        &[
            "IntangibleAssetsNetExcludingGoodwill",
            "FiniteLivedIntangibleAssetsNet",
        ],
    ),
    (
        "total_liabilities",
        "Total Liabilities",
        "Sum of all liabilities",
        BalanceSheet,
        &["Liabilities"],
    ),
    (
        "current_liabilities",
        "Current Liabilities",
        "Obligations due within 1 year",
        BalanceSheet,
        &["LiabilitiesCurrent"],
    ),
    (
        "accounts_payable",
        "Accounts Payable",
        "Money owed to suppliers",
        BalanceSheet,
        &[
            "AccountsPayableCurrent",
            "AccountsPayableAndAccruedLiabilitiesCurrent",
        ],
    ),
    (
        "long_term_debt",
        "Long-Term Debt",
        "Debt obligations due after 1 year",
        BalanceSheet,
        &[
            "LongTermDebtNoncurrent",
            "LongTermDebt",
            "LongTermDebtAndCapitalLeaseObligations",
        ],
    ),
    (
        "total_debt",
        "Total Debt",
        "All debt (short + long term)",
        BalanceSheet,
        &[
            "DebtLongtermAndShorttermCombinedAmount",
            "LongTermDebtAndCapitalLeaseObligations",
        ],
    ),
    (
        "total_equity",
        "Total Equity",
        "Shareholders' equity (book value)",
        BalanceSheet,
        &[
            "StockholdersEquity",
            "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
            "Equity",
        ],
    ),
    (
        "retained_earnings",
        "Retained Earnings",
        "Accumulated profits not paid as dividends",
        BalanceSheet,
        &["RetainedEarningsAccumulatedDeficit"],
    ),
    // Cash flow
    (
        "operating_cash_flow",
        "Operating Cash Flow",
        "Cash generated from core business operations",
        CashFlow,
        &["NetCashProvidedByUsedInOperatingActivities"],
    ),
    (
        "depreciation_amortization",
        "D&A",
        "Depreciation and amortization (non-cash)",
        CashFlow,
        &[
            "DepreciationDepletionAndAmortization",
            "DepreciationAndAmortization",
            "Depreciation",
        ],
    ),
    (
        "stock_based_compensation",
        "Stock-Based Comp",
        "Non-cash compensation expense",
        CashFlow,
        &[
            "ShareBasedCompensation",
            "StockIssuedDuringPeriodValueShareBasedCompensation",
            "AllocatedShareBasedCompensationExpense",
        ],
    ),
    (
        "investing_cash_flow",
        "Investing Cash Flow",
        "Cash used for investments (CapEx, acquisitions)",
        CashFlow,
        &["NetCashProvidedByUsedInInvestingActivities"],
    ),
    (
        "capex",
        "Capital Expenditures",
        "Cash spent on property, plant & equipment",
        CashFlow,
        &[
            "PaymentsToAcquirePropertyPlantAndEquipment",
            "CapitalExpendituresIncurredButNotYetPaid",
        ],
    ),
    (
        "acquisitions",
        "Acquisitions",
        "Cash spent acquiring businesses",
        CashFlow,
        &[
            "PaymentsToAcquireBusinessesNetOfCashAcquired",
            "PaymentsToAcquireBusinessesGross",
        ],
    ),
    (
        "financing_cash_flow",
        "Financing Cash Flow",
        "Cash from/to shareholders and creditors",
        CashFlow,
        &["NetCashProvidedByUsedInFinancingActivities"],
    ),
    (
        "dividends_paid",
        "Dividends Paid",
        "Cash dividends paid to shareholders",
        CashFlow,
        &[
            "PaymentsOfDividendsCommonStock",
            "PaymentsOfDividends",
            "DividendsCash",
        ],
    ),
    (
        "share_repurchases",
        "Share Repurchases",
        "Cash spent buying back stock",
        CashFlow,
        &[
            "PaymentsForRepurchaseOfCommonStock",
            "PaymentsForRepurchaseOfEquity",
        ],
    ),
];

// =============================================================================
// Catalog
// =============================================================================

/// Immutable lookup table from concept key to [`ConceptMapping`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagCatalog {
    concepts: BTreeMap<String, ConceptMapping>,
}

impl TagCatalog {
    /// Builds the standard catalog covering income statement, balance sheet
    /// and cash flow concepts.
    #[must_use]
    pub fn standard() -> Self {
        STANDARD_CONCEPTS
            .iter()
            .map(|(key, name, description, statement, tags)| {
                ConceptMapping::new(*key, *name, *description, *statement, tags.iter().copied())
            })
            .collect()
    }

    /// Looks up a concept by key.
    ///
    /// # Errors
    /// Returns [`XbrlError::UnknownConcept`] if the key is not registered.
    pub fn get(&self, key: &str) -> Result<&ConceptMapping> {
        self.concepts
            .get(key)
            .ok_or_else(|| XbrlError::UnknownConcept(key.to_string()))
    }

    /// Returns true if the key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.concepts.contains_key(key)
    }

    /// Iterates over registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.concepts.keys().map(String::as_str)
    }

    /// Iterates over all mappings.
    pub fn iter(&self) -> impl Iterator<Item = &ConceptMapping> {
        self.concepts.values()
    }

    /// Iterates over the concepts of one statement.
    pub fn by_statement(&self, statement: StatementCategory) -> impl Iterator<Item = &ConceptMapping> {
        self.concepts
            .values()
            .filter(move |mapping| mapping.statement == statement)
    }

    /// Returns the number of registered concepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Returns true if no concepts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Applies company-specific overrides, returning a new catalog.
    ///
    /// # Errors
    /// Returns [`XbrlError::UnknownConcept`] if an override replaces or
    /// prepends to a key that is not registered.
    pub fn with_overrides(&self, overrides: &CatalogOverride) -> Result<Self> {
        let mut concepts = self.concepts.clone();

        for op in &overrides.ops {
            match op {
                OverrideOp::Replace { key, tags } => {
                    let mapping = concepts
                        .get_mut(key)
                        .ok_or_else(|| XbrlError::UnknownConcept(key.clone()))?;
                    mapping.tags = dedup_tags(tags.iter().cloned());
                }
                OverrideOp::Prepend { key, tags } => {
                    let mapping = concepts
                        .get_mut(key)
                        .ok_or_else(|| XbrlError::UnknownConcept(key.clone()))?;
                    let merged = tags.iter().chain(mapping.tags.iter()).cloned();
                    mapping.tags = dedup_tags(merged);
                }
                OverrideOp::Add(mapping) => {
                    let mut mapping = mapping.clone();
                    mapping.tags = dedup_tags(mapping.tags.into_iter());
                    concepts.insert(mapping.key.clone(), mapping);
                }
            }
        }

        Ok(Self { concepts })
    }
}

impl FromIterator<ConceptMapping> for TagCatalog {
    fn from_iter<I: IntoIterator<Item = ConceptMapping>>(iter: I) -> Self {
        Self {
            concepts: iter
                .into_iter()
                .map(|mapping| (mapping.key.clone(), mapping))
                .collect(),
        }
    }
}

/// Keeps the first occurrence of each tag, dropping empty names.
fn dedup_tags(tags: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

// =============================================================================
// Overrides
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum OverrideOp {
    Replace { key: String, tags: Vec<String> },
    Prepend { key: String, tags: Vec<String> },
    Add(ConceptMapping),
}

/// Company-specific changes layered over a base catalog.
///
/// Operations apply in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogOverride {
    ops: Vec<OverrideOp>,
}

impl CatalogOverride {
    /// Creates an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole tag list of an existing concept.
    #[must_use]
    pub fn replace<I, S>(mut self, key: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ops.push(OverrideOp::Replace {
            key: key.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Puts tags ahead of an existing concept's list. Tags already present
    /// move to the front.
    #[must_use]
    pub fn prepend<I, S>(mut self, key: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ops.push(OverrideOp::Prepend {
            key: key.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds (or wholly replaces) a concept.
    #[must_use]
    pub fn add(mut self, mapping: ConceptMapping) -> Self {
        self.ops.push(OverrideOp::Add(mapping));
        self
    }

    /// Returns true if no operations are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
