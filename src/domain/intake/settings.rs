//! Immutable per-session settings snapshot.
//!
//! Built-in defaults are merged with an optional JSON overlay when a session
//! starts. Sessions hold the result behind an `Arc` and never observe later
//! overlay writes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::ValidationError;

/// Business thresholds used by the validators and the classifier gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub min_description_len: usize,
    pub min_location_len: usize,
    /// Minimum classifier confidence, `0..=100`.
    pub confidence_threshold: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_description_len: 10,
            min_location_len: 3,
            confidence_threshold: 70,
        }
    }
}

/// How many consecutive invalid replies a step tolerates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// `None` means unbounded.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
        }
    }

    /// True once `attempts` invalid replies have used up the budget.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts >= max,
            None => false,
        }
    }
}

/// User-facing message templates. Placeholders look like `{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageCatalog {
    pub welcome: String,
    pub ask_identity: String,
    pub small_talk: String,
    pub identity_not_found: String,
    pub greet_reporter: String,
    pub description_too_short: String,
    pub area_detected: String,
    pub area_menu_intro: String,
    pub menu_out_of_range: String,
    pub building_menu_intro: String,
    pub other_location_option: String,
    pub room_menu_intro: String,
    pub media_request: String,
    pub media_optional_hint: String,
    pub media_invalid: String,
    pub media_required: String,
    pub media_too_large: String,
    pub media_upload_failed: String,
    pub ask_location: String,
    pub location_too_short: String,
    pub confirmation_summary: String,
    pub confirmation_reprompt: String,
    pub confirmation_rejected: String,
    pub submission_created: String,
    pub submission_failed: String,
    pub retries_exhausted: String,
    pub closed: String,
    pub text_expected: String,
    pub no_areas: String,
    pub skip_words: Vec<String>,
    pub affirmative_words: Vec<String>,
    pub negative_words: Vec<String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            welcome: "¡Hola! Soy el asistente de reportes del campus. Para empezar, escribe tu código de estudiante o tu DNI.".into(),
            ask_identity: "Por favor, escribe tu código de estudiante o tu número de DNI (solo números).".into(),
            small_talk: "¡Hola! Estoy aquí para ayudarte a reportar un problema en el campus. Escribe tu código de estudiante o tu DNI para continuar.".into(),
            identity_not_found: "No encontré a nadie con el número {code}. Verifícalo e inténtalo de nuevo.".into(),
            greet_reporter: "¡Hola, {name}! Cuéntame, ¿qué problema quieres reportar?".into(),
            description_too_short: "La descripción es muy corta. Cuéntame un poco más del problema (mínimo {min} caracteres).".into(),
            area_detected: "Entiendo, tu reporte corresponde a {area}.".into(),
            area_menu_intro: "¿A qué área corresponde tu reporte? Responde con el número:".into(),
            menu_out_of_range: "Elige un número entre 1 y {max}.".into(),
            building_menu_intro: "¿En qué edificio ocurre el problema? Responde con el número:".into(),
            other_location_option: "Otro lugar".into(),
            room_menu_intro: "¿En qué ambiente de {building}? Responde con el número:".into(),
            media_request: "Envía una foto: {label}.".into(),
            media_optional_hint: " (opcional, escribe \"omitir\" para saltar)".into(),
            media_invalid: "Necesito una imagen para \"{label}\". Sube una foto o pega un enlace.".into(),
            media_required: "La foto \"{label}\" es obligatoria.".into(),
            media_too_large: "La imagen supera el tamaño máximo permitido de {max} bytes.".into(),
            media_upload_failed: "No pude guardar la imagen. Inténtalo otra vez.".into(),
            ask_location: "¿Dónde ocurre el problema? Indica el lugar lo más preciso posible.".into(),
            location_too_short: "La ubicación es muy corta (mínimo {min} caracteres). ¿Dónde ocurre el problema?".into(),
            confirmation_summary: "Resumen de tu reporte:\n- Área: {area}\n- Descripción: {description}\n- Ubicación: {location}\n{media}¿Confirmas el envío? (sí/no)".into(),
            confirmation_reprompt: "Responde \"sí\" para enviar el reporte o \"no\" para corregirlo.".into(),
            confirmation_rejected: "De acuerdo, empecemos de nuevo. Describe el problema que quieres reportar.".into(),
            submission_created: "¡Listo! Tu reporte fue registrado con el código {id}.".into(),
            submission_failed: "No pude registrar tu reporte. Responde \"sí\" para intentarlo de nuevo.".into(),
            retries_exhausted: "Demasiados intentos no válidos. Empecemos otra vez.".into(),
            closed: "Conversación cerrada. ¡Gracias por tu reporte!".into(),
            text_expected: "Por ahora necesito una respuesta escrita.".into(),
            no_areas: "No hay áreas disponibles en este momento. Inténtalo más tarde.".into(),
            skip_words: words(&["omitir", "saltar", "ninguna", "no tengo", "skip", "siguiente"]),
            affirmative_words: words(&[
                "si", "s", "claro", "confirmo", "correcto", "ok", "dale", "yes", "de acuerdo", "enviar",
            ]),
            negative_words: words(&["no", "n", "nop", "cancelar", "incorrecto", "corregir"]),
        }
    }
}

/// System prompts for the language-model calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptCatalog {
    pub small_talk: String,
    pub classify: String,
    pub extract: String,
    pub follow_up: String,
    pub improve_description: String,
    pub suggest_location: String,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self {
            small_talk: "Eres el asistente de reportes de incidencias del campus. Responde en español, en una o dos oraciones amables, y pide al usuario su código de estudiante o su DNI.".into(),
            classify: "Clasificas reportes de incidencias del campus en una de las áreas numeradas. Responde solo con JSON: {\"index\": <número de área>, \"confidence\": <0-100>, \"rationale\": \"<motivo breve>\"}.".into(),
            extract: "Extraes datos de un reporte de incidencia del área {area}. Responde solo con JSON: {\"description\": \"<descripción clara>\", \"location\": \"<lugar o null>\", \"urgency\": \"baja|media|alta\", \"extras\": {}}. Campos adicionales posibles: {fields}.".into(),
            follow_up: "Eres el asistente de reportes del campus. El reporte fue asignado al área {area}. Escribe una sola oración en español que lo confirme de forma amable.".into(),
            improve_description: "Reescribe la descripción de una incidencia del campus en español claro y breve, sin inventar datos. Responde solo con la descripción.".into(),
            suggest_location: "Normaliza el lugar de una incidencia del campus (edificio, piso, ambiente) en una frase corta en español, sin inventar datos. Responde solo con el lugar.".into(),
        }
    }
}

/// Everything a session needs that may be tuned at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeSettings {
    pub thresholds: Thresholds,
    pub retry: RetryPolicy,
    pub max_media_bytes: usize,
    pub media_folder: String,
    pub messages: MessageCatalog,
    pub prompts: PromptCatalog,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            retry: RetryPolicy::default(),
            max_media_bytes: 10 * 1024 * 1024,
            media_folder: "reportes".to_string(),
            messages: MessageCatalog::default(),
            prompts: PromptCatalog::default(),
        }
    }
}

impl IntakeSettings {
    /// Returns a new snapshot with `overrides` deep-merged on top of `self`.
    ///
    /// Objects merge key by key; any other value replaces the base value.
    /// `null` leaves the base untouched.
    pub fn with_overrides(&self, overrides: &Value) -> Result<Self, ValidationError> {
        if !(overrides.is_object() || overrides.is_null()) {
            return Err(ValidationError::invalid_format(
                "overrides",
                "settings overrides must be a JSON object",
            ));
        }

        let mut base = serde_json::to_value(self)
            .map_err(|e| ValidationError::invalid_format("settings", e.to_string()))?;
        deep_merge(&mut base, overrides);

        let merged: IntakeSettings = serde_json::from_value(base)
            .map_err(|e| ValidationError::invalid_format("overrides", e.to_string()))?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.thresholds.confidence_threshold > 100 {
            return Err(ValidationError::out_of_range(
                "confidence_threshold",
                0,
                100,
                i64::from(self.thresholds.confidence_threshold),
            ));
        }
        if self.thresholds.min_description_len == 0 {
            return Err(ValidationError::out_of_range("min_description_len", 1, i64::MAX, 0));
        }
        if self.thresholds.min_location_len == 0 {
            return Err(ValidationError::out_of_range("min_location_len", 1, i64::MAX, 0));
        }
        if self.retry.max_attempts == Some(0) {
            return Err(ValidationError::out_of_range("max_attempts", 1, i64::MAX, 0));
        }
        if self.max_media_bytes == 0 {
            return Err(ValidationError::out_of_range("max_media_bytes", 1, i64::MAX, 0));
        }
        if self.media_folder.trim().is_empty() {
            return Err(ValidationError::empty_field("media_folder"));
        }
        Ok(())
    }
}

/// Substitutes `{key}` placeholders. Unknown placeholders are left as is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_documented_values() {
        let s = IntakeSettings::default();
        assert_eq!(s.thresholds.min_description_len, 10);
        assert_eq!(s.thresholds.min_location_len, 3);
        assert_eq!(s.thresholds.confidence_threshold, 70);
        assert_eq!(s.retry.max_attempts, None);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn overrides_merge_nested_keys_only() {
        let base = IntakeSettings::default();
        let merged = base
            .with_overrides(&json!({
                "thresholds": { "confidence_threshold": 85 },
                "messages": { "welcome": "Bienvenido" }
            }))
            .unwrap();

        assert_eq!(merged.thresholds.confidence_threshold, 85);
        assert_eq!(merged.thresholds.min_description_len, 10);
        assert_eq!(merged.messages.welcome, "Bienvenido");
        assert_eq!(merged.messages.closed, base.messages.closed);
        // the base snapshot is untouched
        assert_eq!(base.thresholds.confidence_threshold, 70);
    }

    #[test]
    fn null_overlay_is_a_no_op() {
        let base = IntakeSettings::default();
        assert_eq!(base.with_overrides(&Value::Null).unwrap(), base);
    }

    #[test]
    fn non_object_overlay_is_rejected() {
        let base = IntakeSettings::default();
        assert!(base.with_overrides(&json!([1, 2])).is_err());
    }

    #[test]
    fn invalid_merged_values_are_rejected() {
        let base = IntakeSettings::default();
        assert!(base
            .with_overrides(&json!({ "thresholds": { "confidence_threshold": 150 } }))
            .is_err());
        assert!(base
            .with_overrides(&json!({ "thresholds": { "min_location_len": "tres" } }))
            .is_err());
    }

    #[test]
    fn retry_policy_bounds() {
        assert!(!RetryPolicy::unbounded().is_exhausted(1_000));
        let policy = RetryPolicy::bounded(3);
        assert!(!policy.is_exhausted(2));
        assert!(policy.is_exhausted(3));
    }

    #[test]
    fn render_replaces_known_placeholders() {
        assert_eq!(
            render("Elige un número entre 1 y {max}.", &[("max", "5")]),
            "Elige un número entre 1 y 5."
        );
        assert_eq!(render("{a} {b}", &[("a", "x")]), "x {b}");
    }
}
