// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Persona catalog
//!
//! Named presets that overwrite the active system prompt and reset the
//! conversation. The catalog is static and read-only at runtime.

/// System prompt used before any persona is applied
pub const INITIAL_SYSTEM_PROMPT: &str = "You are Fahz GPT, a smart AI assistant created by \
     Fahz-Company and powered by Google Gemini. Always introduce yourself as Fahz GPT if asked.";

/// A named system-prompt preset
#[derive(Debug, Clone)]
pub struct Persona {
    /// Stable identifier used by `/persona <id>` and the CLI
    pub id: &'static str,

    /// Display name
    pub name: &'static str,

    /// One-line description shown in the catalog view
    pub description: &'static str,

    /// System prompt applied when the persona is selected
    pub system_prompt: &'static str,

    /// Icon shown next to the name
    pub icon: &'static str,
}

/// The built-in persona catalog
pub fn builtin() -> &'static [Persona] {
    const PERSONAS: &[Persona] = &[
        Persona {
            id: "fahz-default",
            name: "Fahz Standard",
            description: "The standard Fahz GPT configuration for general help.",
            system_prompt: "You are Fahz GPT, a powerful and helpful AI assistant created by \
                 Fahz-Company and powered by Google Gemini. You are professional, efficient, \
                 and friendly.",
            icon: "🚀",
        },
        Persona {
            id: "tutor",
            name: "Fahz Math Tutor",
            description: "Explains math concepts the Fahz-Company way.",
            system_prompt: "You are Fahz GPT Math Tutor. Explain concepts simply, use \
                 analogies, and provide step-by-step solutions while maintaining the \
                 Fahz-Company brand voice.",
            icon: "📐",
        },
        Persona {
            id: "reviewer",
            name: "Fahz Code Expert",
            description: "Focused on bug detection and code optimization.",
            system_prompt: "You are Fahz GPT Code Expert. Review the provided code for bugs, \
                 security vulnerabilities, and suggest best practices for clean, maintainable \
                 code.",
            icon: "💻",
        },
        Persona {
            id: "chef",
            name: "Fahz Master Chef",
            description: "Recipe ideas and professional cooking techniques.",
            system_prompt: "You are Fahz GPT Sous Chef. Help the user create delicious meals \
                 based on their available ingredients.",
            icon: "🍳",
        },
    ];
    PERSONAS
}

/// Look up a persona by id
pub fn find(id: &str) -> Option<&'static Persona> {
    builtin().iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_nonempty() {
        assert_eq!(builtin().len(), 4);
    }

    #[test]
    fn test_catalog_ids_unique() {
        let personas = builtin();
        for (i, a) in personas.iter().enumerate() {
            for b in &personas[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_every_persona_has_prompt_and_icon() {
        for p in builtin() {
            assert!(!p.system_prompt.is_empty(), "{} has no prompt", p.id);
            assert!(!p.icon.is_empty(), "{} has no icon", p.id);
            assert!(!p.description.is_empty(), "{} has no description", p.id);
        }
    }

    #[test]
    fn test_find_by_id() {
        let tutor = find("tutor").unwrap();
        assert_eq!(tutor.name, "Fahz Math Tutor");
        assert!(find("missing").is_none());
    }
}
