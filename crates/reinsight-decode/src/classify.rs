//! # Indicator Classification — The Dispatch Table
//!
//! A captured query identifies its indicator only indirectly: by the name
//! of its first selected output field, disambiguated by its own filter
//! predicates (which transaction type, which listing type, which data
//! category) and occasionally by which grouping fields appear elsewhere in
//! the select list.
//!
//! Classification is an ordered table of rule functions evaluated
//! top-to-bottom; the first rule that recognizes the query wins. Adding an
//! indicator means appending a rule, not deepening a branch. A query no
//! rule recognizes classifies to `None` — the backend issues plenty of
//! auxiliary queries that are not modeled as metrics, so this is routine
//! and silent.

use reinsight_core::QueryView;
use serde::{Deserialize, Serialize};

/// Sales transactions are split by construction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalesSegment {
    /// Completed ("ready") properties.
    Ready,
    /// Off-plan properties.
    OffPlan,
}

/// Rental transactions are split by contract version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RentSegment {
    /// Newly signed contracts.
    New,
    /// Renewed contracts.
    Renewed,
}

/// One named slot in the output metric bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorSlot {
    /// Sales transaction count for one segment.
    SalesVolume(SalesSegment),
    /// Average sales transaction price for one segment.
    SalesAvgPrice(SalesSegment),
    /// Rental transaction count for one segment.
    RentVolume(RentSegment),
    /// Average rental price for one segment.
    RentAvgPrice(RentSegment),
    /// Active sale-listing count.
    SalesListingVolume,
    /// Average sale-listing price.
    SalesListingAvgPrice,
    /// Active rent-listing count.
    RentListingVolume,
    /// Average rent-listing price.
    RentListingAvgPrice,
    /// Monthly sales price trend, by bedroom category.
    SalesPriceTrend,
    /// Monthly rent value trend, by bedroom category.
    RentPriceTrend,
    /// Monthly gross rental yield, by bedroom category.
    GrossRentalYield,
    /// Monthly price-to-rent ratio, by bedroom category.
    PriceToRentRatio,
    /// Yearly occupancy rate, by property category.
    OccupancyRate,
    /// Yearly average service charges, by property category.
    AverageServiceCharges,
    /// Residential unit counts by construction status.
    ResidentialSupply,
    /// Completed residential supply by bedroom count.
    ReadySupplyByBedroom,
    /// Under-construction residential supply by bedroom count.
    UpcomingSupplyByBedroom,
    /// Yearly residential supply, by construction status.
    ResidentialSupplyTrendByYear,
}

/// The row shape a slot's results decode from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// A single measure value in a flat row group.
    Scalar,
    /// Rows keyed by millisecond epoch, sub-values labeled from the
    /// hierarchy list by position.
    MonthSeries,
    /// Rows keyed by calendar year, sub-values labeled from the hierarchy
    /// list by position.
    YearSeries,
    /// Like [`ShapeKind::YearSeries`], but sub-values carry an explicit
    /// label index (`I`) instead of relying on position alone.
    YearSeriesIndexed,
    /// `C`-pair rows whose first element is the label itself.
    LiteralCategories,
    /// `C`-pair rows whose first element indexes the `D0` value dictionary.
    DictCategories,
}

impl IndicatorSlot {
    /// The row shape this slot decodes from.
    pub fn shape(&self) -> ShapeKind {
        use IndicatorSlot::*;
        match self {
            SalesVolume(_) | SalesAvgPrice(_) | RentVolume(_) | RentAvgPrice(_)
            | SalesListingVolume | SalesListingAvgPrice | RentListingVolume
            | RentListingAvgPrice => ShapeKind::Scalar,
            SalesPriceTrend | RentPriceTrend | GrossRentalYield | PriceToRentRatio => {
                ShapeKind::MonthSeries
            }
            OccupancyRate | AverageServiceCharges => ShapeKind::YearSeries,
            ResidentialSupplyTrendByYear => ShapeKind::YearSeriesIndexed,
            ResidentialSupply => ShapeKind::LiteralCategories,
            ReadySupplyByBedroom | UpcomingSupplyByBedroom => ShapeKind::DictCategories,
        }
    }
}

// Select-field tokens, verbatim from the backend's data model.
const TRANSACTION_VOLUME: &str = "##Transaction Volume";
const TRANSACTION_AVG_PRICE: &str = "##Transaction Avg Price";
const LISTING_VOLUME: &str = "#Listing Volume";
const LISTING_AVG_PRICE: &str = "#Listing Avg Price";
const INDICATOR_AVG: &str = "Avg(pbi_ae_indicators_mv.Value)";
const INDICATOR_SUM: &str = "Sum(pbi_ae_indicators_mv.value)";
const SUPPLY_UNIT_SUM: &str = "Sum(pbi_ae_supply_mv.number_of_unit)";
const SUPPLY_UNITS_SUM: &str = "Sum(pbi_ae_supply_mv.Units)";
const CALENDAR_YEAR: &str = "Calendar.Year";
const PROPERTY_STATUS: &str = "pbi_ae_supply_mv.property_status";

type Rule = fn(&QueryView) -> Option<IndicatorSlot>;

/// The dispatch table. Order matters: rules mirror the precedence of the
/// capture sessions' query families and are evaluated top-to-bottom.
const RULES: &[Rule] = &[
    transaction_volume,
    transaction_avg_price,
    listing_volume,
    listing_avg_price,
    indicator_month_series,
    indicator_year_series,
    supply_by_category,
    supply_trend,
];

/// Classify a query view into the indicator slot its results fill.
///
/// Deterministic: identical `(select, filters)` always map to the same
/// slot. Unrecognized queries return `None`.
pub fn classify(view: &QueryView) -> Option<IndicatorSlot> {
    RULES.iter().find_map(|rule| rule(view))
}

fn first_select_contains(view: &QueryView, token: &str) -> bool {
    view.first_select().is_some_and(|name| name.contains(token))
}

/// Transaction type and, for rentals, contract version pick the segment.
fn transaction_segment(view: &QueryView) -> Option<TransactionSegment> {
    match view.filter_value("Transaction Type")? {
        "Sales - Ready" => Some(TransactionSegment::Sales(SalesSegment::Ready)),
        "Sales - Off-Plan" => Some(TransactionSegment::Sales(SalesSegment::OffPlan)),
        "Rent" => match view.filter_value("Version")? {
            "New" => Some(TransactionSegment::Rent(RentSegment::New)),
            "Renewed" => Some(TransactionSegment::Rent(RentSegment::Renewed)),
            _ => None,
        },
        _ => None,
    }
}

enum TransactionSegment {
    Sales(SalesSegment),
    Rent(RentSegment),
}

fn transaction_volume(view: &QueryView) -> Option<IndicatorSlot> {
    if !first_select_contains(view, TRANSACTION_VOLUME) {
        return None;
    }
    Some(match transaction_segment(view)? {
        TransactionSegment::Sales(segment) => IndicatorSlot::SalesVolume(segment),
        TransactionSegment::Rent(segment) => IndicatorSlot::RentVolume(segment),
    })
}

fn transaction_avg_price(view: &QueryView) -> Option<IndicatorSlot> {
    if !first_select_contains(view, TRANSACTION_AVG_PRICE) {
        return None;
    }
    Some(match transaction_segment(view)? {
        TransactionSegment::Sales(segment) => IndicatorSlot::SalesAvgPrice(segment),
        TransactionSegment::Rent(segment) => IndicatorSlot::RentAvgPrice(segment),
    })
}

fn listing_volume(view: &QueryView) -> Option<IndicatorSlot> {
    if !first_select_contains(view, LISTING_VOLUME) {
        return None;
    }
    match view.filter_value("Listing Type")? {
        "Sale" => Some(IndicatorSlot::SalesListingVolume),
        "Rent" => Some(IndicatorSlot::RentListingVolume),
        _ => None,
    }
}

fn listing_avg_price(view: &QueryView) -> Option<IndicatorSlot> {
    if !first_select_contains(view, LISTING_AVG_PRICE) {
        return None;
    }
    match view.filter_value("Listing Type")? {
        "Sale" => Some(IndicatorSlot::SalesListingAvgPrice),
        "Rent" => Some(IndicatorSlot::RentListingAvgPrice),
        _ => None,
    }
}

/// Month-keyed indicator series: the averaged indicator-value field,
/// disambiguated by the `Data Type` predicate.
fn indicator_month_series(view: &QueryView) -> Option<IndicatorSlot> {
    if !first_select_contains(view, INDICATOR_AVG) {
        return None;
    }
    match view.filter_value("Data Type")? {
        "Sales Prices" => Some(IndicatorSlot::SalesPriceTrend),
        "Rent Values" => Some(IndicatorSlot::RentPriceTrend),
        "Yield Rates" => Some(IndicatorSlot::GrossRentalYield),
        "Price-to-Rent Ratios" => Some(IndicatorSlot::PriceToRentRatio),
        _ => None,
    }
}

/// Year-keyed indicator series: the summed indicator-value field grouped
/// by calendar year.
fn indicator_year_series(view: &QueryView) -> Option<IndicatorSlot> {
    if !first_select_contains(view, INDICATOR_SUM) || !view.selects(CALENDAR_YEAR) {
        return None;
    }
    match view.filter_value("Data Type")? {
        "Occupancy Rate" => Some(IndicatorSlot::OccupancyRate),
        "Service Charges" => Some(IndicatorSlot::AverageServiceCharges),
        _ => None,
    }
}

/// Supply unit counts without a period grouping: keyed by construction
/// status when the status grouping field is selected, otherwise by
/// bedroom count with the `Status` predicate picking ready vs upcoming.
fn supply_by_category(view: &QueryView) -> Option<IndicatorSlot> {
    if !first_select_contains(view, SUPPLY_UNIT_SUM) {
        return None;
    }
    if view.selects(PROPERTY_STATUS) {
        return Some(IndicatorSlot::ResidentialSupply);
    }
    match view.filter_value("Status")? {
        "Existing" => Some(IndicatorSlot::ReadySupplyByBedroom),
        "Under Construction" => Some(IndicatorSlot::UpcomingSupplyByBedroom),
        _ => None,
    }
}

/// Supply units grouped by both construction status and year. Unlike the
/// other rules this one matches its measure field anywhere in the select
/// list — the capture emits it behind the grouping fields.
fn supply_trend(view: &QueryView) -> Option<IndicatorSlot> {
    if view.selects(SUPPLY_UNITS_SUM) && view.selects(PROPERTY_STATUS) {
        Some(IndicatorSlot::ResidentialSupplyTrendByYear)
    } else {
        None
    }
}
