use serde::{Deserialize, Serialize};

/// Station document as served by `GET /estacoes/` and
/// `GET /estacoes/uid/{uid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDto {
    pub id: i64,
    pub uid: String,
    pub nome: String,
    pub status: String,
    #[serde(default)]
    pub sensores: Vec<SensorDto>,
}

/// Sensor binding embedded in a station document. `id` refers to the
/// parameter the sensor reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorDto {
    pub id: i64,
    pub nome: String,
}

/// Parameter document as served by `GET /parametros/` and
/// `GET /parametros/{id}`. `json` is the raw field key readings arrive
/// under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDto {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub json: Option<String>,
}

/// Measurement body for `POST /medidas/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementDto {
    pub estacao_id: i64,
    pub parametro_id: i64,
    pub valor: f64,
    pub data_hora: String,
}
