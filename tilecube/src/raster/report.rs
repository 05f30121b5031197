//! JSON reports produced by `gdalinfo -json` and `ogrinfo -json`.

use super::{BandInfo, BandStatistics, RasterInfo};
use crate::grid::Bounds;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GdalInfoReport {
    #[serde(default)]
    pub size: Vec<u64>,
    #[serde(default)]
    pub geo_transform: Vec<f64>,
    #[serde(default)]
    pub coordinate_system: Option<CoordinateSystem>,
    #[serde(default)]
    pub bands: Vec<BandReport>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CoordinateSystem {
    #[serde(default)]
    pub wkt: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BandReport {
    #[serde(default)]
    pub description: String,
    /// Number, or a string such as `"nan"` for non-finite values
    #[serde(default)]
    pub no_data_value: Option<Value>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub mean: Option<f64>,
}

impl GdalInfoReport {
    /// Converts the report, or names the first missing field.
    pub fn into_info(self) -> Result<RasterInfo, String> {
        let size = match self.size.as_slice() {
            [cols, rows] => (*cols, *rows),
            _ => return Err("missing raster size".to_string()),
        };
        let geo_transform: [f64; 6] = self
            .geo_transform
            .try_into()
            .map_err(|_| "missing geotransform".to_string())?;
        let wkt = self.coordinate_system.map(|cs| cs.wkt).unwrap_or_default();
        let bands = self
            .bands
            .into_iter()
            .map(|b| BandInfo {
                nodata: b.no_data_value.as_ref().and_then(json_number),
                description: b.description,
            })
            .collect();

        Ok(RasterInfo {
            size,
            geo_transform,
            wkt,
            bands,
        })
    }

    pub fn statistics(&self) -> Vec<BandStatistics> {
        self.bands
            .iter()
            .map(|b| BandStatistics {
                min: b.minimum,
                max: b.maximum,
                mean: b.mean,
            })
            .collect()
    }
}

fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct OgrInfoReport {
    #[serde(default)]
    pub layers: Vec<LayerReport>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LayerReport {
    #[serde(default)]
    pub geometry_fields: Vec<GeometryField>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeometryField {
    /// `[min_x, min_y, max_x, max_y]`
    #[serde(default)]
    pub extent: Vec<f64>,
}

impl OgrInfoReport {
    /// Extent of the first layer's first geometry field.
    pub fn extent(&self) -> Option<Bounds> {
        let field = self.layers.first()?.geometry_fields.first()?;
        match field.extent.as_slice() {
            [min_x, min_y, max_x, max_y] => Some(Bounds::new(*min_x, *min_y, *max_x, *max_y)),
            _ => None,
        }
    }
}
