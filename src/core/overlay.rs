//! Overlay records for the overlay store.
//!
//! An overlay is a timed image composited onto video: where it sits, how
//! wide it is, when it appears, for how long, and how it blends in and
//! transitions. Records are pure data; persistence lives in
//! [`crate::storage`].

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Background treatment behind an overlay image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fondo {
    /// No backdrop.
    Transparente,
    /// Semi-opaque backdrop.
    Opacidad,
}

impl Fondo {
    /// All accepted values, in schema order.
    pub const ALL: [Self; 2] = [Self::Transparente, Self::Opacidad];

    /// Returns the stored text value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transparente => "transparente",
            Self::Opacidad => "opacidad",
        }
    }
}

impl fmt::Display for Fondo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Fondo {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: OverlayField::Fondo.column().to_string(),
                value: s.to_string(),
                expected: "transparente|opacidad".to_string(),
            })
    }
}

/// Transition style used when an overlay enters and leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transicion {
    /// Cross-fade.
    Difuminado,
    /// Slide in from the side.
    Lateral,
}

impl Transicion {
    /// All accepted values, in schema order.
    pub const ALL: [Self; 2] = [Self::Difuminado, Self::Lateral];

    /// Returns the stored text value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Difuminado => "difuminado",
            Self::Lateral => "lateral",
        }
    }
}

impl fmt::Display for Transicion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Transicion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: OverlayField::Transicion.column().to_string(),
                value: s.to_string(),
                expected: "difuminado|lateral".to_string(),
            })
    }
}

/// A single timed image overlay.
///
/// # Examples
///
/// ```
/// use overlay_store::core::{Fondo, OverlayItem, Transicion};
///
/// let item = OverlayItem::new("logo.png", 10, 20, 200, 1.5, 3.0, Fondo::Opacidad, Transicion::Lateral);
/// assert!(item.id.is_none());
/// assert!((item.end_time() - 4.5).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayItem {
    /// Unique identifier (assigned by storage layer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Image location.
    pub url_imagen: String,

    /// Horizontal position in pixels.
    pub posicion_x: i64,

    /// Vertical position in pixels.
    pub posicion_y: i64,

    /// Rendered width in pixels.
    pub ancho: i64,

    /// Start time in seconds.
    pub tiempo_inicio: f64,

    /// Display duration in seconds.
    pub duracion: f64,

    /// Background treatment.
    pub fondo: Fondo,

    /// Transition style.
    pub transicion: Transicion,
}

impl OverlayItem {
    /// Creates an unsaved overlay.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url_imagen: impl Into<String>,
        posicion_x: i64,
        posicion_y: i64,
        ancho: i64,
        tiempo_inicio: f64,
        duracion: f64,
        fondo: Fondo,
        transicion: Transicion,
    ) -> Self {
        Self {
            id: None,
            url_imagen: url_imagen.into(),
            posicion_x,
            posicion_y,
            ancho,
            tiempo_inicio,
            duracion,
            fondo,
            transicion,
        }
    }

    /// Time in seconds at which the overlay disappears.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.tiempo_inicio + self.duracion
    }

    /// Checks that both time columns hold finite numbers.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] for a NaN or infinite
    /// `tiempo_inicio` or `duracion`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_finite(OverlayField::TiempoInicio, self.tiempo_inicio)?;
        check_finite(OverlayField::Duracion, self.duracion)
    }

    /// Applies the fields set in `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: &OverlayUpdate) {
        if let Some(ref url) = update.url_imagen {
            self.url_imagen.clone_from(url);
        }
        if let Some(x) = update.posicion_x {
            self.posicion_x = x;
        }
        if let Some(y) = update.posicion_y {
            self.posicion_y = y;
        }
        if let Some(ancho) = update.ancho {
            self.ancho = ancho;
        }
        if let Some(inicio) = update.tiempo_inicio {
            self.tiempo_inicio = inicio;
        }
        if let Some(duracion) = update.duracion {
            self.duracion = duracion;
        }
        if let Some(fondo) = update.fondo {
            self.fondo = fondo;
        }
        if let Some(transicion) = update.transicion {
            self.transicion = transicion;
        }
    }
}

/// An updatable overlay column. `id` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayField {
    /// `url_imagen`
    UrlImagen,
    /// `posicion_x`
    PosicionX,
    /// `posicion_y`
    PosicionY,
    /// `ancho`
    Ancho,
    /// `tiempo_inicio`
    TiempoInicio,
    /// `duracion`
    Duracion,
    /// `fondo`
    Fondo,
    /// `transicion`
    Transicion,
}

impl OverlayField {
    /// All updatable columns in table order.
    pub const ALL: [Self; 8] = [
        Self::UrlImagen,
        Self::PosicionX,
        Self::PosicionY,
        Self::Ancho,
        Self::TiempoInicio,
        Self::Duracion,
        Self::Fondo,
        Self::Transicion,
    ];

    /// Column name in the `overlays` table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::UrlImagen => "url_imagen",
            Self::PosicionX => "posicion_x",
            Self::PosicionY => "posicion_y",
            Self::Ancho => "ancho",
            Self::TiempoInicio => "tiempo_inicio",
            Self::Duracion => "duracion",
            Self::Fondo => "fondo",
            Self::Transicion => "transicion",
        }
    }
}

impl fmt::Display for OverlayField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.column())
    }
}

impl FromStr for OverlayField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.column() == s)
            .ok_or_else(|| ValidationError::UnknownField {
                name: s.to_string(),
            })
    }
}

/// A typed column value produced by [`OverlayUpdate::assignments`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// INTEGER column value.
    Integer(i64),
    /// REAL column value.
    Real(f64),
    /// TEXT column value.
    Text(String),
}

/// A partial update: each column independently optional.
///
/// # Examples
///
/// ```
/// use overlay_store::core::OverlayUpdate;
///
/// let update = OverlayUpdate::from_pairs(["ancho=500", "fondo=opacidad"]).unwrap();
/// assert_eq!(update.ancho, Some(500));
/// assert_eq!(update.assignments().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayUpdate {
    /// New image location.
    pub url_imagen: Option<String>,
    /// New horizontal position.
    pub posicion_x: Option<i64>,
    /// New vertical position.
    pub posicion_y: Option<i64>,
    /// New width.
    pub ancho: Option<i64>,
    /// New start time.
    pub tiempo_inicio: Option<f64>,
    /// New duration.
    pub duracion: Option<f64>,
    /// New background treatment.
    pub fondo: Option<Fondo>,
    /// New transition style.
    pub transicion: Option<Transicion>,
}

impl OverlayUpdate {
    /// Creates an update with no fields set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }

    /// Set fields as `(column, value)` pairs, in table column order.
    #[must_use]
    pub fn assignments(&self) -> Vec<(OverlayField, FieldValue)> {
        let mut out = Vec::new();
        if let Some(ref url) = self.url_imagen {
            out.push((OverlayField::UrlImagen, FieldValue::Text(url.clone())));
        }
        if let Some(x) = self.posicion_x {
            out.push((OverlayField::PosicionX, FieldValue::Integer(x)));
        }
        if let Some(y) = self.posicion_y {
            out.push((OverlayField::PosicionY, FieldValue::Integer(y)));
        }
        if let Some(ancho) = self.ancho {
            out.push((OverlayField::Ancho, FieldValue::Integer(ancho)));
        }
        if let Some(inicio) = self.tiempo_inicio {
            out.push((OverlayField::TiempoInicio, FieldValue::Real(inicio)));
        }
        if let Some(duracion) = self.duracion {
            out.push((OverlayField::Duracion, FieldValue::Real(duracion)));
        }
        if let Some(fondo) = self.fondo {
            out.push((OverlayField::Fondo, FieldValue::Text(fondo.as_str().to_string())));
        }
        if let Some(transicion) = self.transicion {
            out.push((
                OverlayField::Transicion,
                FieldValue::Text(transicion.as_str().to_string()),
            ));
        }
        out
    }

    /// Checks that any time column being set holds a finite number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] for a NaN or infinite value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(inicio) = self.tiempo_inicio {
            check_finite(OverlayField::TiempoInicio, inicio)?;
        }
        if let Some(duracion) = self.duracion {
            check_finite(OverlayField::Duracion, duracion)?;
        }
        Ok(())
    }

    /// Parses `raw` into the slot for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] if `raw` does not parse as
    /// the column's type.
    pub fn set(&mut self, field: OverlayField, raw: &str) -> Result<(), ValidationError> {
        match field {
            OverlayField::UrlImagen => self.url_imagen = Some(raw.to_string()),
            OverlayField::PosicionX => self.posicion_x = Some(parse_integer(field, raw)?),
            OverlayField::PosicionY => self.posicion_y = Some(parse_integer(field, raw)?),
            OverlayField::Ancho => self.ancho = Some(parse_integer(field, raw)?),
            OverlayField::TiempoInicio => self.tiempo_inicio = Some(parse_real(field, raw)?),
            OverlayField::Duracion => self.duracion = Some(parse_real(field, raw)?),
            OverlayField::Fondo => self.fondo = Some(raw.parse()?),
            OverlayField::Transicion => self.transicion = Some(raw.parse()?),
        }
        Ok(())
    }

    /// Builds an update from `field=value` assignments. Later assignments to
    /// the same field win.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a missing `=`, an unknown field
    /// name, or a value of the wrong type.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut update = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| ValidationError::MalformedAssignment(pair.to_string()))?;
            let field: OverlayField = name.trim().parse()?;
            update.set(field, value.trim())?;
        }
        Ok(update)
    }
}

fn parse_integer(field: OverlayField, raw: &str) -> Result<i64, ValidationError> {
    raw.parse().map_err(|_| ValidationError::InvalidValue {
        field: field.column().to_string(),
        value: raw.to_string(),
        expected: "integer".to_string(),
    })
}

fn parse_real(field: OverlayField, raw: &str) -> Result<f64, ValidationError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| not_finite(field, raw))
}

fn check_finite(field: OverlayField, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(not_finite(field, &value.to_string()))
    }
}

fn not_finite(field: OverlayField, raw: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.column().to_string(),
        value: raw.to_string(),
        expected: "finite number".to_string(),
    }
}
