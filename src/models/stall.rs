// src/models/stall.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::lenient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StallStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    #[serde(rename = "Under Maintenance")]
    UnderMaintenance,
    Inactive,
    /// Qualquer status desconhecido gravado por versões antigas.
    #[serde(other)]
    Unknown,
}

impl StallStatus {
    pub fn label(self) -> &'static str {
        match self {
            StallStatus::Available => "Available",
            StallStatus::Occupied => "Occupied",
            StallStatus::Reserved => "Reserved",
            StallStatus::UnderMaintenance => "Under Maintenance",
            StallStatus::Inactive => "Inactive",
            StallStatus::Unknown => "Unknown",
        }
    }

    /// Estados em que a banca pode receber uma nova locação (a ocupação real vem dos contratos).
    pub fn is_leasable(self) -> bool {
        !matches!(self, StallStatus::Inactive | StallStatus::UnderMaintenance | StallStatus::Unknown)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ElectricityType {
    Fixed,
    Metered,
    #[default]
    Optional,
    #[serde(rename = "None")]
    NoElectricity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WaterType {
    Shared,
    Dedicated,
    #[default]
    #[serde(rename = "None")]
    NoWater,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StallStructure {
    #[default]
    Fixed,
    #[serde(rename = "Non-Fixed")]
    NonFixed,
}

/// Atributos descritivos; nenhuma regra depende deles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StallUtilities {
    pub has_electricity: bool,
    pub electricity_type: ElectricityType,
    pub has_water: bool,
    pub water_type: WaterType,
    pub has_drainage: bool,
    pub has_ventilation: bool,
    pub stall_structure: StallStructure,
}

impl ElectricityType {
    pub fn label(self) -> &'static str {
        match self {
            ElectricityType::Fixed => "Fixed",
            ElectricityType::Metered => "Metered",
            ElectricityType::Optional => "Optional",
            ElectricityType::NoElectricity => "None",
        }
    }
}

impl WaterType {
    pub fn label(self) -> &'static str {
        match self {
            WaterType::Shared => "Shared",
            WaterType::Dedicated => "Dedicated",
            WaterType::NoWater => "None",
        }
    }
}

impl StallStructure {
    pub fn label(self) -> &'static str {
        match self {
            StallStructure::Fixed => "Fixed",
            StallStructure::NonFixed => "Non-Fixed",
        }
    }
}

impl StallUtilities {
    // `query` já vem em minúsculas
    fn matches(&self, query: &str) -> bool {
        (self.has_electricity && "electricity".contains(query))
            || (self.has_water && "water".contains(query))
            || (self.has_drainage && "drainage".contains(query))
            || (self.has_ventilation && "ventilation".contains(query))
            || [
                self.electricity_type.label(),
                self.water_type.label(),
                self.stall_structure.label(),
            ]
            .iter()
            .any(|label| label.to_lowercase().contains(query))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stall {
    #[schema(example = "ST-010")]
    pub id: String,

    #[serde(rename = "type", default)]
    #[schema(example = "Stall")]
    pub stall_type: String,

    #[serde(default)]
    #[schema(example = "Dry Goods")]
    pub section: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    #[schema(example = "6x6m")]
    pub dimensions: String,

    #[serde(default = "default_capacity")]
    pub capacity: u32,

    #[serde(default)]
    pub status: StallStatus,

    #[serde(default, deserialize_with = "lenient::string")]
    pub lease_id: String,

    #[serde(default, alias = "original_owner")]
    pub original_owner: String,

    #[serde(default, alias = "recent_owner")]
    pub recent_owner: String,

    #[serde(flatten)]
    pub utilities: StallUtilities,

    // Geometria no mapa esquemático do mercado
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub w: f64,
    #[serde(default)]
    pub h: f64,

    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date_added: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
}

fn default_capacity() -> u32 {
    1
}

impl Stall {
    /// Busca textual da tela de inventário: campos de texto, status e utilidades.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        let haystack = [
            self.id.as_str(),
            &self.stall_type,
            &self.section,
            &self.location,
            &self.dimensions,
            self.status.label(),
            &self.lease_id,
            &self.original_owner,
            &self.recent_owner,
        ]
        .join(" ")
        .to_lowercase();

        haystack.contains(&query) || self.utilities.matches(&query)
    }
}

/// Cadastro e edição de banca. Na edição, campos ausentes ficam como estão.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StallPayload {
    /// ID explícito (opcional); sem ele o próximo `ST-NNN` é usado.
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub stall_type: Option<String>,
    pub section: Option<String>,
    pub location: Option<String>,
    pub dimensions: Option<String>,
    pub capacity: Option<u32>,
    pub status: Option<StallStatus>,
    #[serde(alias = "original_owner")]
    pub original_owner: Option<String>,
    #[serde(alias = "recent_owner")]
    pub recent_owner: Option<String>,
    pub has_electricity: Option<bool>,
    pub electricity_type: Option<ElectricityType>,
    pub has_water: Option<bool>,
    pub water_type: Option<WaterType>,
    pub has_drainage: Option<bool>,
    pub has_ventilation: Option<bool>,
    pub stall_structure: Option<StallStructure>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
}

impl StallPayload {
    pub fn apply_to(self, stall: &mut Stall) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut stall.stall_type, self.stall_type);
        set(&mut stall.section, self.section);
        set(&mut stall.location, self.location);
        set(&mut stall.dimensions, self.dimensions);
        set(&mut stall.capacity, self.capacity);
        set(&mut stall.status, self.status);
        set(&mut stall.original_owner, self.original_owner);
        set(&mut stall.recent_owner, self.recent_owner);

        let utilities = &mut stall.utilities;
        set(&mut utilities.has_electricity, self.has_electricity);
        set(&mut utilities.electricity_type, self.electricity_type);
        set(&mut utilities.has_water, self.has_water);
        set(&mut utilities.water_type, self.water_type);
        set(&mut utilities.has_drainage, self.has_drainage);
        set(&mut utilities.has_ventilation, self.has_ventilation);
        set(&mut utilities.stall_structure, self.stall_structure);

        set(&mut stall.x, self.x);
        set(&mut stall.y, self.y);
        set(&mut stall.w, self.w);
        set(&mut stall.h, self.h);
    }
}

impl Stall {
    /// Banca nova com os valores padrão do formulário de cadastro.
    pub fn blank(id: impl Into<String>) -> Self {
        Stall {
            id: id.into(),
            stall_type: String::new(),
            section: String::new(),
            location: String::new(),
            dimensions: String::new(),
            capacity: default_capacity(),
            status: StallStatus::Available,
            lease_id: String::new(),
            original_owner: String::new(),
            recent_owner: String::new(),
            utilities: StallUtilities::default(),
            x: 20.0,
            y: 20.0,
            w: 6.0,
            h: 6.0,
            date_added: None,
            last_updated: None,
        }
    }
}
