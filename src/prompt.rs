//! Prompt construction
//!
//! A prompt is three parts: persona text, the rendered conversation
//! history, and a closing instruction naming the persona.

use crate::conversation::ConversationTurn;

/// Label introducing the history block
pub const HISTORY_LABEL: &str = "Historico da conversa:";

/// Assistant character prepended to every prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
    pub personality: String,
    pub language: String,
}

impl Persona {
    /// The default Brazilian-Portuguese assistant
    pub fn aurelia() -> Self {
        Self {
            name: "Aurelia".to_string(),
            personality: "Voce e Aurelia, uma assistente virtual brasileira carismatica e \
                inteligente. Voce sempre responde em portugues brasileiro de forma natural, \
                acolhedora e bem-humorada. Voce e prestativa, curiosa e gosta de ajudar as \
                pessoas com qualquer assunto."
                .to_string(),
            language: "pt-BR".to_string(),
        }
    }
}

impl Persona {
    /// Reply language as written into the closing instruction
    pub fn language_name(&self) -> &str {
        match self.language.as_str() {
            "pt-BR" => "portugues brasileiro",
            "pt-PT" => "portugues europeu",
            other => other,
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::aurelia()
    }
}

/// Render turns as `Role: content` lines
pub fn render_history(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role().label(), turn.content()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn closing_instruction(persona: &Persona) -> String {
    format!(
        "Responda a ultima mensagem do usuario como {}, em {}:",
        persona.name,
        persona.language_name()
    )
}

/// Assemble the full prompt sent to the text API
pub fn build_prompt(persona: &Persona, turns: &[ConversationTurn]) -> String {
    format!(
        "{}\n\n{}\n{}\n\n{}",
        persona.personality,
        HISTORY_LABEL,
        render_history(turns),
        closing_instruction(persona)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn test_render_history() {
        let turns = vec![
            ConversationTurn::new(Role::User, "Oi"),
            ConversationTurn::new(Role::Assistant, "Ola! Tudo bem?"),
        ];
        assert_eq!(render_history(&turns), "User: Oi\nAssistant: Ola! Tudo bem?");
    }

    #[test]
    fn test_render_empty_history() {
        assert_eq!(render_history(&[]), "");
    }

    #[test]
    fn test_multiline_content_kept_verbatim() {
        let turns = vec![ConversationTurn::new(Role::User, "linha 1\nlinha 2")];
        assert_eq!(render_history(&turns), "User: linha 1\nlinha 2");
    }

    #[test]
    fn test_closing_instruction_names_persona() {
        let mut persona = Persona::aurelia();
        assert_eq!(
            closing_instruction(&persona),
            "Responda a ultima mensagem do usuario como Aurelia, em portugues brasileiro:"
        );
        persona.name = "Bia".to_string();
        assert!(closing_instruction(&persona).contains("como Bia,"));
    }

    #[test]
    fn test_closing_instruction_follows_language() {
        let mut persona = Persona::aurelia();
        assert_eq!(persona.language_name(), "portugues brasileiro");

        persona.language = "pt-PT".to_string();
        assert!(closing_instruction(&persona).ends_with("em portugues europeu:"));

        persona.language = "es".to_string();
        assert!(closing_instruction(&persona).ends_with("em es:"));
    }

    #[test]
    fn test_build_prompt_layout() {
        let persona = Persona::aurelia();
        let turns = vec![ConversationTurn::new(Role::User, "Oi")];
        let prompt = build_prompt(&persona, &turns);

        let expected = format!(
            "{}\n\nHistorico da conversa:\nUser: Oi\n\n{}",
            persona.personality,
            closing_instruction(&persona)
        );
        assert_eq!(prompt, expected);
        assert!(prompt.starts_with("Voce e Aurelia"));
    }

    #[test]
    fn test_build_prompt_without_history() {
        let persona = Persona::aurelia();
        let prompt = build_prompt(&persona, &[]);
        assert!(prompt.contains("Historico da conversa:\n\n"));
        assert!(!prompt.contains("User:"));
    }
}
