//! Component template and localization registries.
//!
//! Both registries are immutable configuration objects: they are built
//! once at startup (from the built-in set or from a TOML file) and
//! passed by reference into the generator. Nothing mutates them at
//! runtime.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Language used when a requested language has no localization table.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A registered component template.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentTemplate {
    pub component_name: String,
    /// Free-form classification tag, e.g. `functional`.
    pub kind: String,
    /// Template text carrying `{l10n.key}` markers.
    pub template: String,
    /// Localization keys this component needs, in render order.
    pub required_keys: Vec<String>,
}

/// Immutable lookup table from component type to template.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    components: BTreeMap<String, ComponentTemplate>,
}

impl TemplateRegistry {
    pub fn new(components: BTreeMap<String, ComponentTemplate>) -> Self {
        Self { components }
    }

    pub fn get(&self, component_type: &str) -> Option<&ComponentTemplate> {
        self.components.get(component_type)
    }

    /// Registered component types, sorted. Surfaced to callers as the
    /// remediation list when an unknown component is requested.
    pub fn component_types(&self) -> Vec<String> {
        self.components.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Immutable per-language string tables.
#[derive(Debug, Clone)]
pub struct LocalizationRegistry {
    default_language: String,
    tables: BTreeMap<String, BTreeMap<String, String>>,
}

impl LocalizationRegistry {
    pub fn new(
        default_language: impl Into<String>,
        tables: BTreeMap<String, BTreeMap<String, String>>,
    ) -> Self {
        Self {
            default_language: default_language.into(),
            tables,
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Resolve a requested language to the one that will actually be
    /// used: the request itself when a table exists for it, otherwise
    /// the default language.
    pub fn resolve<'a>(&'a self, requested: &'a str) -> &'a str {
        if self.tables.contains_key(requested) {
            requested
        } else {
            &self.default_language
        }
    }

    pub fn table(&self, language: &str) -> Option<&BTreeMap<String, String>> {
        self.tables.get(language)
    }

    pub fn languages(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse registry file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("registry defines no components")]
    NoComponents,
    #[error("default language `{0}` has no localization table")]
    MissingDefaultTable(String),
}

/// On-disk registry format.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default = "default_language_name")]
    default_language: String,
    components: BTreeMap<String, ComponentTemplate>,
    localization: BTreeMap<String, BTreeMap<String, String>>,
}

fn default_language_name() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Load both registries from a TOML file.
pub fn load_registry_file(
    path: &Path,
) -> Result<(TemplateRegistry, LocalizationRegistry), RegistryError> {
    let raw = std::fs::read_to_string(path)?;
    let file: RegistryFile = toml::from_str(&raw)?;

    if file.components.is_empty() {
        return Err(RegistryError::NoComponents);
    }
    if !file.localization.contains_key(&file.default_language) {
        return Err(RegistryError::MissingDefaultTable(file.default_language));
    }

    Ok((
        TemplateRegistry::new(file.components),
        LocalizationRegistry::new(file.default_language, file.localization),
    ))
}

/// Built-in registry: four components, four languages.
pub fn builtin() -> (TemplateRegistry, LocalizationRegistry) {
    (builtin_templates(), builtin_localization())
}

fn builtin_templates() -> TemplateRegistry {
    let mut components = BTreeMap::new();

    components.insert(
        "welcome".to_string(),
        ComponentTemplate {
            component_name: "WelcomeComponent".to_string(),
            kind: "functional".to_string(),
            template: r#"
import React from 'react';

const WelcomeComponent = ({ className = "welcome-container" }) => {
  return (
    <div className={className}>
      <div className="welcome-wrapper">
        <header className="welcome-header">
          <h1 className="welcome-title" data-l10n="welcome_title">
            {l10n.welcome_title}
          </h1>
          <p className="welcome-subtitle" data-l10n="welcome_subtitle">
            {l10n.welcome_subtitle}
          </p>
        </header>
        <div className="welcome-actions">
          <button
            className="btn btn-primary"
            onClick={handleLogin}
            data-l10n="login_button"
          >
            {l10n.login_button}
          </button>
          <button
            className="btn btn-secondary"
            onClick={handleSignup}
            data-l10n="signup_button"
          >
            {l10n.signup_button}
          </button>
        </div>
      </div>
    </div>
  );
};

export default WelcomeComponent;
"#
            .to_string(),
            required_keys: vec![
                "welcome_title".to_string(),
                "welcome_subtitle".to_string(),
                "login_button".to_string(),
                "signup_button".to_string(),
            ],
        },
    );

    components.insert(
        "navigation".to_string(),
        ComponentTemplate {
            component_name: "NavigationComponent".to_string(),
            kind: "functional".to_string(),
            template: r#"
import React from 'react';

const NavigationComponent = ({ className = "navigation-container" }) => {
  return (
    <nav className={className}>
      <ul className="nav-list">
        <li className="nav-item">
          <a href="/" className="nav-link" data-l10n="navigation_home">
            {l10n.navigation_home}
          </a>
        </li>
        <li className="nav-item">
          <a href="/about" className="nav-link" data-l10n="navigation_about">
            {l10n.navigation_about}
          </a>
        </li>
        <li className="nav-item">
          <a href="/contact" className="nav-link" data-l10n="navigation_contact">
            {l10n.navigation_contact}
          </a>
        </li>
      </ul>
    </nav>
  );
};

export default NavigationComponent;
"#
            .to_string(),
            required_keys: vec![
                "navigation_home".to_string(),
                "navigation_about".to_string(),
                "navigation_contact".to_string(),
            ],
        },
    );

    components.insert(
        "user_profile".to_string(),
        ComponentTemplate {
            component_name: "UserProfileComponent".to_string(),
            kind: "functional".to_string(),
            template: r#"
import React from 'react';

const UserProfileComponent = ({ className = "user-profile-container" }) => {
  return (
    <div className={className}>
      <div className="profile-wrapper">
        <h2 className="profile-title" data-l10n="user_profile_title">
          {l10n.user_profile_title}
        </h2>
        <div className="profile-actions">
          <button
            className="btn btn-outline"
            onClick={handleEditProfile}
            data-l10n="user_profile_edit"
          >
            {l10n.user_profile_edit}
          </button>
        </div>
      </div>
    </div>
  );
};

export default UserProfileComponent;
"#
            .to_string(),
            required_keys: vec![
                "user_profile_title".to_string(),
                "user_profile_edit".to_string(),
            ],
        },
    );

    components.insert(
        "footer".to_string(),
        ComponentTemplate {
            component_name: "FooterComponent".to_string(),
            kind: "functional".to_string(),
            template: r#"
import React from 'react';

const FooterComponent = ({ className = "footer-container" }) => {
  return (
    <footer className={className}>
      <div className="footer-content">
        <p className="footer-copyright" data-l10n="footer_copyright">
          {l10n.footer_copyright}
        </p>
      </div>
    </footer>
  );
};

export default FooterComponent;
"#
            .to_string(),
            required_keys: vec!["footer_copyright".to_string()],
        },
    );

    TemplateRegistry::new(components)
}

fn builtin_localization() -> LocalizationRegistry {
    fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    let mut tables = BTreeMap::new();

    tables.insert(
        "en".to_string(),
        table(&[
            ("welcome_title", "Welcome to Our App"),
            ("welcome_subtitle", "Your journey starts here"),
            ("login_button", "Log In"),
            ("signup_button", "Sign Up"),
            ("navigation_home", "Home"),
            ("navigation_about", "About"),
            ("navigation_contact", "Contact"),
            ("footer_copyright", "© 2024 Our Company. All rights reserved."),
            ("user_profile_title", "User Profile"),
            ("user_profile_edit", "Edit Profile"),
            ("settings_title", "Settings"),
            ("settings_language", "Language"),
            ("settings_theme", "Theme"),
            ("error_404", "Page not found"),
            ("error_500", "Internal server error"),
        ]),
    );

    tables.insert(
        "es".to_string(),
        table(&[
            ("welcome_title", "Bienvenido a Nuestra App"),
            ("welcome_subtitle", "Tu viaje comienza aquí"),
            ("login_button", "Iniciar Sesión"),
            ("signup_button", "Registrarse"),
            ("navigation_home", "Inicio"),
            ("navigation_about", "Acerca de"),
            ("navigation_contact", "Contacto"),
            (
                "footer_copyright",
                "© 2024 Nuestra Empresa. Todos los derechos reservados.",
            ),
            ("user_profile_title", "Perfil de Usuario"),
            ("user_profile_edit", "Editar Perfil"),
            ("settings_title", "Configuración"),
            ("settings_language", "Idioma"),
            ("settings_theme", "Tema"),
            ("error_404", "Página no encontrada"),
            ("error_500", "Error interno del servidor"),
        ]),
    );

    tables.insert(
        "fr".to_string(),
        table(&[
            ("welcome_title", "Bienvenue dans Notre App"),
            ("welcome_subtitle", "Votre voyage commence ici"),
            ("login_button", "Se Connecter"),
            ("signup_button", "S'inscrire"),
            ("navigation_home", "Accueil"),
            ("navigation_about", "À Propos"),
            ("navigation_contact", "Contact"),
            (
                "footer_copyright",
                "© 2024 Notre Entreprise. Tous droits réservés.",
            ),
            ("user_profile_title", "Profil Utilisateur"),
            ("user_profile_edit", "Modifier le Profil"),
            ("settings_title", "Paramètres"),
            ("settings_language", "Langue"),
            ("settings_theme", "Thème"),
            ("error_404", "Page non trouvée"),
            ("error_500", "Erreur interne du serveur"),
        ]),
    );

    tables.insert(
        "de".to_string(),
        table(&[
            ("welcome_title", "Willkommen in Unserer App"),
            ("welcome_subtitle", "Ihre Reise beginnt hier"),
            ("login_button", "Anmelden"),
            ("signup_button", "Registrieren"),
            ("navigation_home", "Startseite"),
            ("navigation_about", "Über Uns"),
            ("navigation_contact", "Kontakt"),
            (
                "footer_copyright",
                "© 2024 Unser Unternehmen. Alle Rechte vorbehalten.",
            ),
            ("user_profile_title", "Benutzerprofil"),
            ("user_profile_edit", "Profil Bearbeiten"),
            ("settings_title", "Einstellungen"),
            ("settings_language", "Sprache"),
            ("settings_theme", "Design"),
            ("error_404", "Seite nicht gefunden"),
            ("error_500", "Interner Serverfehler"),
        ]),
    );

    LocalizationRegistry::new(DEFAULT_LANGUAGE, tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_is_consistent() {
        let (templates, localization) = builtin();

        assert_eq!(
            templates.component_types(),
            vec!["footer", "navigation", "user_profile", "welcome"]
        );
        assert_eq!(localization.languages(), vec!["de", "en", "es", "fr"]);

        // Every required key of every component exists in the default table.
        let table = localization
            .table(localization.default_language())
            .expect("default table");
        for component_type in templates.component_types() {
            let template = templates.get(&component_type).expect("template");
            for key in &template.required_keys {
                assert!(table.contains_key(key), "missing default key {key}");
            }
        }
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let (_, localization) = builtin();
        assert_eq!(localization.resolve("es"), "es");
        assert_eq!(localization.resolve("zh"), "en");
        assert_eq!(localization.resolve(""), "en");
    }

    #[test]
    fn registry_file_parses() {
        let raw = r#"
default_language = "en"

[components.greeting]
component_name = "GreetingComponent"
kind = "functional"
template = "<p>{l10n.hello}</p>"
required_keys = ["hello"]

[localization.en]
hello = "Hello"

[localization.it]
hello = "Ciao"
"#;
        let file: RegistryFile = toml::from_str(raw).expect("parse");
        assert_eq!(file.default_language, "en");
        assert_eq!(file.components.len(), 1);
        assert_eq!(file.localization.len(), 2);
    }
}
