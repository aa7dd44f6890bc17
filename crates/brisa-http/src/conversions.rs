use crate::models::{MeasurementDto, ParameterDto, SensorDto, StationDto};
use brisa_domain::{Measurement, Parameter, Sensor, Station, StationStatus};

/// Wire value the downstream API uses for an active station.
const STATION_STATUS_ACTIVE: &str = "ativa";

/// Downstream `data_hora` format: ISO 8601, second precision, no zone.
const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

impl From<StationDto> for Station {
    fn from(dto: StationDto) -> Self {
        let status = if dto.status == STATION_STATUS_ACTIVE {
            StationStatus::Active
        } else {
            StationStatus::Inactive
        };

        Station {
            id: dto.id,
            uid: dto.uid,
            name: dto.nome,
            status,
            sensors: dto.sensores.into_iter().map(Sensor::from).collect(),
        }
    }
}

impl From<SensorDto> for Sensor {
    fn from(dto: SensorDto) -> Self {
        Sensor {
            parameter_id: dto.id,
            name: dto.nome,
        }
    }
}

impl From<ParameterDto> for Parameter {
    fn from(dto: ParameterDto) -> Self {
        Parameter {
            id: dto.id,
            name: dto.nome,
            field_key: dto.json.filter(|key| !key.is_empty()),
        }
    }
}

impl From<&Measurement> for MeasurementDto {
    fn from(measurement: &Measurement) -> Self {
        MeasurementDto {
            estacao_id: measurement.station_id,
            parametro_id: measurement.parameter_id,
            valor: measurement.value,
            data_hora: measurement
                .measured_at
                .format(EVENT_TIME_FORMAT)
                .to_string(),
        }
    }
}
