//! # The Per-Area Metric Bundle
//!
//! One `MetricBundle` holds every indicator decoded for a single area on a
//! single capture date. Field declaration order is the serialization
//! order of the report, so it is part of the output contract: the eight
//! transaction/listing fields first (always present, `null` when unset),
//! then the series and supply fields (present only when decoded).

use std::collections::BTreeMap;

use reinsight_decode::{DecodedValue, IndicatorSlot, RentSegment, SalesSegment};
use serde::{Deserialize, Serialize};

/// Period key → (label → value). Month series key by `YYYY-MM`, year
/// series by `YYYY`.
pub type SeriesValues = BTreeMap<String, BTreeMap<String, f64>>;

/// Label → value, for supply counts keyed by status or bedroom count.
pub type CategoryValues = BTreeMap<String, f64>;

/// Sales metrics split by construction status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesBreakdown {
    pub off_plan_properties: Option<f64>,
    pub ready_properties: Option<f64>,
}

impl SalesBreakdown {
    fn set(&mut self, segment: SalesSegment, value: f64) {
        match segment {
            SalesSegment::OffPlan => self.off_plan_properties = Some(value),
            SalesSegment::Ready => self.ready_properties = Some(value),
        }
    }
}

/// Rental metrics split by contract version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RentBreakdown {
    pub new_rentals: Option<f64>,
    pub renewed_rentals: Option<f64>,
}

impl RentBreakdown {
    fn set(&mut self, segment: RentSegment, value: f64) {
        match segment {
            RentSegment::New => self.new_rentals = Some(value),
            RentSegment::Renewed => self.renewed_rentals = Some(value),
        }
    }
}

/// All decoded indicators for one area and capture date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricBundle {
    pub sales_volume: SalesBreakdown,
    pub sales_avg_price: SalesBreakdown,
    pub sales_listing_volume: Option<f64>,
    pub sales_listing_avg_price: Option<f64>,
    pub rent_volume: RentBreakdown,
    pub rent_listing_volume: Option<f64>,
    pub rent_listing_avg_price: Option<f64>,
    pub rent_avg_price: RentBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_price_trend: Option<SeriesValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_price_trend: Option<SeriesValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_rental_yield: Option<SeriesValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to_rent_ratio: Option<SeriesValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy_rate: Option<SeriesValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_service_charges: Option<SeriesValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residential_supply: Option<CategoryValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_supply_by_bedroom: Option<CategoryValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming_supply_by_bedroom: Option<CategoryValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residential_supply_trend_by_year: Option<SeriesValues>,
}

impl MetricBundle {
    /// Write a decoded value into the field its slot names.
    ///
    /// A value whose shape does not match the slot's is dropped (logged at
    /// `debug`) rather than coerced; classification and decoding agree on
    /// shapes, so a mismatch means the payload itself was irregular.
    pub fn apply(&mut self, slot: IndicatorSlot, value: DecodedValue) {
        use DecodedValue::{Categories, Scalar, Series};
        use IndicatorSlot::*;
        match (slot, value) {
            (SalesVolume(segment), Scalar(v)) => self.sales_volume.set(segment, v),
            (SalesAvgPrice(segment), Scalar(v)) => self.sales_avg_price.set(segment, v),
            (RentVolume(segment), Scalar(v)) => self.rent_volume.set(segment, v),
            (RentAvgPrice(segment), Scalar(v)) => self.rent_avg_price.set(segment, v),
            (SalesListingVolume, Scalar(v)) => self.sales_listing_volume = Some(v),
            (SalesListingAvgPrice, Scalar(v)) => self.sales_listing_avg_price = Some(v),
            (RentListingVolume, Scalar(v)) => self.rent_listing_volume = Some(v),
            (RentListingAvgPrice, Scalar(v)) => self.rent_listing_avg_price = Some(v),
            (SalesPriceTrend, Series(s)) => self.sales_price_trend = Some(s),
            (RentPriceTrend, Series(s)) => self.rent_price_trend = Some(s),
            (GrossRentalYield, Series(s)) => self.gross_rental_yield = Some(s),
            (PriceToRentRatio, Series(s)) => self.price_to_rent_ratio = Some(s),
            (OccupancyRate, Series(s)) => self.occupancy_rate = Some(s),
            (AverageServiceCharges, Series(s)) => self.average_service_charges = Some(s),
            (ResidentialSupply, Categories(c)) => self.residential_supply = Some(c),
            (ReadySupplyByBedroom, Categories(c)) => self.ready_supply_by_bedroom = Some(c),
            (UpcomingSupplyByBedroom, Categories(c)) => self.upcoming_supply_by_bedroom = Some(c),
            (ResidentialSupplyTrendByYear, Series(s)) => {
                self.residential_supply_trend_by_year = Some(s)
            }
            (slot, _) => {
                tracing::debug!(?slot, "decoded value shape does not match its slot, dropped");
            }
        }
    }
}
