//! User-facing summary lines, per locale.

use norm_lib::config::Locale;

/// Summary strings for one locale.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn parsed(&self, models: usize, fields: usize) -> String {
        match self.locale {
            Locale::En => format!("Parsed {models} model(s) with {fields} field(s)"),
            Locale::Es => format!("Se analizaron {models} modelo(s) con {fields} campo(s)"),
        }
    }

    pub fn skipped(&self, line: usize, text: &str) -> String {
        match self.locale {
            Locale::En => format!("skipped line {line}: {text}"),
            Locale::Es => format!("línea {line} omitida: {text}"),
        }
    }

    pub fn model_ok(&self, model: &str, title: &str) -> String {
        match self.locale {
            Locale::En => format!("✓ {model} matches database '{title}'"),
            Locale::Es => format!("✓ {model} coincide con la base de datos '{title}'"),
        }
    }

    pub fn undeclared(&self, property: &str) -> String {
        match self.locale {
            Locale::En => format!("  ! '{property}' exists in Notion but not in the schema"),
            Locale::Es => format!("  ! '{property}' existe en Notion pero no en el esquema"),
        }
    }

    pub fn all_valid(&self, models: usize) -> String {
        match self.locale {
            Locale::En => format!("Schema is in sync with Notion ({models} model(s))"),
            Locale::Es => format!("El esquema está sincronizado con Notion ({models} modelo(s))"),
        }
    }
}
