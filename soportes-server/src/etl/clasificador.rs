//! Priority classifier
//!
//! An immutable ordered list of keyword rules, built once at startup.
//! Rules are scanned most-severe-first and the first trigger phrase found
//! anywhere in the description wins: a text mixing urgent and mild
//! language must resolve to the severe level. Total function: when no
//! rule matches the result is NORMAL.

use soportes_common::Prioridad;

/// One classification rule: a target priority and its trigger phrases.
#[derive(Debug, Clone)]
pub struct Regla {
    pub prioridad: Prioridad,
    pub disparadores: Vec<String>,
}

impl Regla {
    pub fn nueva(prioridad: Prioridad, disparadores: &[&str]) -> Self {
        Self {
            prioridad,
            disparadores: disparadores.iter().map(|d| d.to_lowercase()).collect(),
        }
    }
}

/// Keyword classifier over an ordered rule set.
#[derive(Debug, Clone)]
pub struct Clasificador {
    reglas: Vec<Regla>,
}

impl Clasificador {
    /// Build a classifier. Rules are re-ordered by decreasing severity so
    /// the first-match policy always resolves mixed language to the most
    /// severe level, regardless of how the caller listed them.
    pub fn new(mut reglas: Vec<Regla>) -> Self {
        reglas.sort_by(|a, b| b.prioridad.severidad().cmp(&a.prioridad.severidad()));
        Self { reglas }
    }

    pub fn num_reglas(&self) -> usize {
        self.reglas.len()
    }

    /// Classify a free-text incident description. Matching is
    /// case-insensitive and looks for trigger phrases anywhere in the
    /// text; deterministic for a fixed rule set.
    pub fn clasificar(&self, descripcion: &str) -> Prioridad {
        let texto = descripcion.to_lowercase();

        for regla in &self.reglas {
            if regla
                .disparadores
                .iter()
                .any(|disparador| texto.contains(disparador.as_str()))
            {
                return regla.prioridad;
            }
        }

        Prioridad::Normal
    }
}

impl Default for Clasificador {
    fn default() -> Self {
        Clasificador::new(reglas_por_defecto())
    }
}

/// Default rule set for the support domain.
pub fn reglas_por_defecto() -> Vec<Regla> {
    vec![
        Regla::nueva(
            Prioridad::Critica,
            &[
                "urgente",
                "fuego",
                "crash",
                "caída",
                "caído",
                "servidor",
                "error crítico",
            ],
        ),
        Regla::nueva(
            Prioridad::Alta,
            &["fallo", "no funciona", "bloqueado", "lento"],
        ),
        Regla::nueva(
            Prioridad::Media,
            &["intermitente", "consulta", "duda", "molesto"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descripcion_sin_disparadores_es_normal() {
        let clasificador = Clasificador::default();
        assert_eq!(
            clasificador.clasificar("Quisiera cambiar mi dirección de correo"),
            Prioridad::Normal
        );
    }

    #[test]
    fn disparador_critico_gana() {
        let clasificador = Clasificador::default();
        assert_eq!(
            clasificador.clasificar("El servidor se ha caído esta mañana"),
            Prioridad::Critica
        );
    }

    #[test]
    fn severidad_gana_sobre_lenguaje_suave() {
        let clasificador = Clasificador::default();
        // Mixed text: a CRÍTICA trigger plus a MEDIA trigger
        assert_eq!(
            clasificador.clasificar("El servidor se ha caído, no es más que una consulta"),
            Prioridad::Critica
        );
    }

    #[test]
    fn coincidencia_sin_distincion_de_mayusculas() {
        let clasificador = Clasificador::default();
        assert_eq!(clasificador.clasificar("URGENTE!!!"), Prioridad::Critica);
        assert_eq!(
            clasificador.clasificar("La impresora va LENTO"),
            Prioridad::Alta
        );
    }

    #[test]
    fn nivel_media_es_alcanzable() {
        let clasificador = Clasificador::default();
        assert_eq!(
            clasificador.clasificar("Tengo una duda sobre la factura"),
            Prioridad::Media
        );
    }

    #[test]
    fn resultado_deterministico() {
        let clasificador = Clasificador::default();
        let texto = "fallo intermitente al imprimir";
        let primera = clasificador.clasificar(texto);
        for _ in 0..10 {
            assert_eq!(clasificador.clasificar(texto), primera);
        }
        assert_eq!(primera, Prioridad::Alta);
    }

    #[test]
    fn reglas_desordenadas_se_reordenan_por_severidad() {
        let clasificador = Clasificador::new(vec![
            Regla::nueva(Prioridad::Media, &["impresora"]),
            Regla::nueva(Prioridad::Critica, &["incendio"]),
        ]);
        assert_eq!(
            clasificador.clasificar("incendio en la sala de la impresora"),
            Prioridad::Critica
        );
    }
}
