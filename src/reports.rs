//! Static report-table schema registry
//!
//! Every report type the portal collects is declared here with its ordered
//! column list. The registry is loaded once at startup; nothing in the
//! request path introspects the database for column names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of report tables offices can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTable {
    Enrollment,
    Graduates,
    Employability,
    Scholarships,
    WaterConsumption,
    ElectricityConsumption,
    FuelConsumption,
    TelephoneBills,
    InternetExpenses,
    WasteGenerated,
    HazardousWaste,
    FoodWaste,
    PaperConsumption,
    TreePlanting,
    Seedlings,
    SolarPower,
    ReliefOperations,
}

impl ReportTable {
    pub const ALL: [ReportTable; 17] = [
        ReportTable::Enrollment,
        ReportTable::Graduates,
        ReportTable::Employability,
        ReportTable::Scholarships,
        ReportTable::WaterConsumption,
        ReportTable::ElectricityConsumption,
        ReportTable::FuelConsumption,
        ReportTable::TelephoneBills,
        ReportTable::InternetExpenses,
        ReportTable::WasteGenerated,
        ReportTable::HazardousWaste,
        ReportTable::FoodWaste,
        ReportTable::PaperConsumption,
        ReportTable::TreePlanting,
        ReportTable::Seedlings,
        ReportTable::SolarPower,
        ReportTable::ReliefOperations,
    ];

    /// Canonical lowercase name used in API payloads and the
    /// `table_name` columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportTable::Enrollment => "enrollment",
            ReportTable::Graduates => "graduates",
            ReportTable::Employability => "employability",
            ReportTable::Scholarships => "scholarships",
            ReportTable::WaterConsumption => "waterconsumption",
            ReportTable::ElectricityConsumption => "electricityconsumption",
            ReportTable::FuelConsumption => "fuelconsumption",
            ReportTable::TelephoneBills => "telephonebills",
            ReportTable::InternetExpenses => "internetexpenses",
            ReportTable::WasteGenerated => "wastegenerated",
            ReportTable::HazardousWaste => "hazardouswaste",
            ReportTable::FoodWaste => "foodwaste",
            ReportTable::PaperConsumption => "paperconsumption",
            ReportTable::TreePlanting => "treeplanting",
            ReportTable::Seedlings => "seedlings",
            ReportTable::SolarPower => "solarpower",
            ReportTable::ReliefOperations => "reliefoperations",
        }
    }

    /// Parse a user-supplied table name (case-insensitive, trimmed).
    pub fn parse(s: &str) -> Option<ReportTable> {
        let needle = s.trim().to_lowercase();
        ReportTable::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
    }

    /// Physical table holding the denormalized rows for this report type.
    pub fn storage_table(&self) -> &'static str {
        match self {
            ReportTable::Enrollment => "report_enrollment",
            ReportTable::Graduates => "report_graduates",
            ReportTable::Employability => "report_employability",
            ReportTable::Scholarships => "report_scholarships",
            ReportTable::WaterConsumption => "report_waterconsumption",
            ReportTable::ElectricityConsumption => "report_electricityconsumption",
            ReportTable::FuelConsumption => "report_fuelconsumption",
            ReportTable::TelephoneBills => "report_telephonebills",
            ReportTable::InternetExpenses => "report_internetexpenses",
            ReportTable::WasteGenerated => "report_wastegenerated",
            ReportTable::HazardousWaste => "report_hazardouswaste",
            ReportTable::FoodWaste => "report_foodwaste",
            ReportTable::PaperConsumption => "report_paperconsumption",
            ReportTable::TreePlanting => "report_treeplanting",
            ReportTable::Seedlings => "report_seedlings",
            ReportTable::SolarPower => "report_solarpower",
            ReportTable::ReliefOperations => "report_reliefoperations",
        }
    }

    /// Ordered data columns declared for this report type.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ReportTable::Enrollment => &[
                "academic_year",
                "semester",
                "program",
                "year_level",
                "male",
                "female",
            ],
            ReportTable::Graduates => &["academic_year", "program", "male", "female", "total"],
            ReportTable::Employability => &[
                "academic_year",
                "program",
                "employed",
                "unemployed",
                "sample_size",
            ],
            ReportTable::Scholarships => &[
                "academic_year",
                "scholarship_name",
                "grantees",
                "amount",
            ],
            ReportTable::WaterConsumption => &["month", "year", "cubic_meters", "amount"],
            ReportTable::ElectricityConsumption => &["month", "year", "kilowatt_hours", "amount"],
            ReportTable::FuelConsumption => &["month", "year", "vehicle", "liters", "amount"],
            ReportTable::TelephoneBills => &["month", "year", "line", "amount"],
            ReportTable::InternetExpenses => &["month", "year", "provider", "amount"],
            ReportTable::WasteGenerated => &["month", "year", "waste_type", "kilograms"],
            ReportTable::HazardousWaste => &[
                "month",
                "year",
                "waste_type",
                "kilograms",
                "disposal_method",
            ],
            ReportTable::FoodWaste => &["month", "year", "source", "kilograms"],
            ReportTable::PaperConsumption => &["month", "year", "reams", "amount"],
            ReportTable::TreePlanting => &[
                "activity_date",
                "location",
                "species",
                "seedlings_planted",
                "participants",
            ],
            ReportTable::Seedlings => &["activity_date", "nursery", "species", "quantity"],
            ReportTable::SolarPower => &["month", "year", "kilowatt_hours_generated", "savings"],
            ReportTable::ReliefOperations => &[
                "activity_date",
                "location",
                "beneficiaries",
                "assistance_type",
            ],
        }
    }

    /// Human-readable label used in exports.
    pub fn display_name(&self) -> &'static str {
        match self {
            ReportTable::Enrollment => "Enrollment",
            ReportTable::Graduates => "Graduates",
            ReportTable::Employability => "Employability",
            ReportTable::Scholarships => "Scholarships",
            ReportTable::WaterConsumption => "Water Consumption",
            ReportTable::ElectricityConsumption => "Electricity Consumption",
            ReportTable::FuelConsumption => "Fuel Consumption",
            ReportTable::TelephoneBills => "Telephone Bills",
            ReportTable::InternetExpenses => "Internet Expenses",
            ReportTable::WasteGenerated => "Waste Generated",
            ReportTable::HazardousWaste => "Hazardous Waste",
            ReportTable::FoodWaste => "Food Waste",
            ReportTable::PaperConsumption => "Paper Consumption",
            ReportTable::TreePlanting => "Tree Planting",
            ReportTable::Seedlings => "Seedlings",
            ReportTable::SolarPower => "Solar Power",
            ReportTable::ReliefOperations => "Relief Operations",
        }
    }
}

impl fmt::Display for ReportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_tables() {
        assert_eq!(
            ReportTable::parse("waterconsumption"),
            Some(ReportTable::WaterConsumption)
        );
        assert_eq!(
            ReportTable::parse("  Enrollment "),
            Some(ReportTable::Enrollment)
        );
        assert_eq!(ReportTable::parse("WATERCONSUMPTION"), Some(ReportTable::WaterConsumption));
    }

    #[test]
    fn parse_unknown_table() {
        assert_eq!(ReportTable::parse("payroll"), None);
        assert_eq!(ReportTable::parse(""), None);
    }

    #[test]
    fn every_table_declares_columns() {
        for table in ReportTable::ALL {
            assert!(!table.columns().is_empty(), "{} has no columns", table);
            assert!(table.storage_table().starts_with("report_"));
        }
    }

    #[test]
    fn round_trips_through_name() {
        for table in ReportTable::ALL {
            assert_eq!(ReportTable::parse(table.as_str()), Some(table));
        }
    }
}
