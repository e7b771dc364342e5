//! Sesión de chat sobre un `InferenceService` compartido.
use serde::{Deserialize, Serialize};

use crate::serving::{GenerationParams, InferenceService};

pub const QUICK_QUESTIONS: [&str; 4] = ["Hello, how are you?",
                                        "What's the weather like?",
                                        "Tell me a joke",
                                        "What can you help me with?"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Transcript ordenado de turnos usuario/asistente.
pub struct ChatSession<'a> {
    service: &'a InferenceService,
    params: GenerationParams,
    messages: Vec<ChatMessage>,
}

impl<'a> ChatSession<'a> {
    pub fn new(service: &'a InferenceService, params: GenerationParams) -> Self {
        Self { service,
               params,
               messages: Vec::new() }
    }

    pub fn params(&self) -> GenerationParams {
        self.params
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Añade el turno del usuario y la respuesta (incluido el texto de
    /// error en banda) y devuelve la respuesta.
    pub fn send(&mut self, prompt: &str) -> &str {
        self.messages.push(ChatMessage { role: Role::User,
                                         content: prompt.to_string() });
        let reply = self.service.generate(prompt, self.params);
        self.messages.push(ChatMessage { role: Role::Assistant,
                                         content: reply });
        &self.messages[self.messages.len() - 1].content
    }

    /// `None` si el índice no corresponde a ninguna pregunta rápida.
    pub fn ask_quick(&mut self, index: usize) -> Option<&str> {
        let question = QUICK_QUESTIONS.get(index)?;
        Some(self.send(question))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.messages)
    }
}
