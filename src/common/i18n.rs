// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANGUAGE: &str = "en";

// (chave, inglês, português). "{}" é substituído pelos argumentos, na ordem.
const CATALOG: &[(&str, &str, &str)] = &[
    ("validation.failed", "One or more fields are invalid.", "Um ou mais campos são inválidos."),
    ("validation.required", "This field is required.", "Este campo é obrigatório."),
    ("validation.email", "Invalid e-mail address.", "E-mail inválido."),
    ("validation.range", "Value out of the allowed range.", "Valor fora do intervalo permitido."),
    ("validation.length", "Invalid length.", "Tamanho inválido."),
    ("validation.time_format", "Time must use the HH:MM format.", "O horário deve usar o formato HH:MM."),
    ("validation.time_order", "Time out must be after time in.", "A saída deve ser posterior à entrada."),
    ("validation.date_order", "End date must not be before start date.", "A data final não pode ser anterior à inicial."),
    ("validation.amount_positive", "Amount must be greater than zero.", "O valor deve ser maior que zero."),
    ("validation.decision", "Status must be Approved/Accepted or Rejected/Denied.", "O status deve ser Approved/Accepted ou Rejected/Denied."),
    ("validation.review", "Review must approve or reject.", "A revisão deve aprovar ou rejeitar."),
    ("validation.unknown_courses", "Unknown course ids.", "Cursos inexistentes."),
    ("validation.unknown_users", "Unknown employee ids.", "Funcionários inexistentes."),
    ("auth.invalid_token", "Authentication token is invalid or missing.", "Token de autenticação inválido ou ausente."),
    ("auth.forbidden", "You do not have permission to perform this action.", "Você não tem permissão para realizar esta ação."),
    ("employee.not_linked", "No employee record is linked to this user.", "Nenhum funcionário vinculado a este usuário."),
    ("resource.not_found", "Resource not found: {}", "Recurso não encontrado: {}"),
    ("request.invalid_transition", "Cannot change status from {} to {}.", "Não é possível mudar o status de {} para {}."),
    ("request.already_processed", "This request was already processed.", "Esta solicitação já foi processada."),
    ("lms.already_enrolled", "User is already enrolled in this course.", "Usuário já matriculado neste curso."),
    ("lms.prerequisites_not_met", "Prerequisite courses are not completed.", "Os cursos pré-requisito não foram concluídos."),
    ("lms.prerequisite_cycle", "Prerequisites would form a cycle.", "Os pré-requisitos formariam um ciclo."),
    ("tms.training_full", "This training has no seats left.", "Este treinamento não possui vagas."),
    ("tms.training_closed", "This training is not accepting applications.", "Este treinamento não aceita inscrições."),
    ("tms.completion_not_passed", "Certificates are issued only for passed completions.", "Certificados só são emitidos para conclusões aprovadas."),
    ("db.unique_violation", "Record already exists: {}", "Registro já existe: {}"),
    ("db.invalid_reference", "Referenced record does not exist: {}", "Registro referenciado não existe: {}"),
    ("internal.unexpected", "An unexpected error occurred.", "Ocorreu um erro inesperado."),
];

// Catálogo de mensagens por idioma.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut en = HashMap::new();
        let mut pt = HashMap::new();
        for (key, en_msg, pt_msg) in CATALOG {
            en.insert(*key, *en_msg);
            pt.insert(*key, *pt_msg);
        }

        let mut messages = HashMap::new();
        messages.insert("en", en);
        messages.insert("pt", pt);
        Self { messages }
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.messages.contains_key(lang)
    }

    /// Traduz `key` para `lang`, caindo para o inglês e, por fim, para a própria chave.
    pub fn translate(&self, lang: &str, key: &str, args: &[&str]) -> String {
        let found = self
            .messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANGUAGE).and_then(|m| m.get(key)));

        let template: &str = match found {
            Some(t) => t,
            None => key,
        };

        let mut out = String::with_capacity(template.len());
        let mut args = args.iter();
        let mut rest = template;
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            out.push_str(args.next().copied().unwrap_or(""));
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_then_key() {
        let store = I18nStore::new();
        assert_eq!(store.translate("de", "auth.forbidden", &[]), "You do not have permission to perform this action.");
        assert_eq!(store.translate("pt", "no.such.key", &[]), "no.such.key");
    }

    #[test]
    fn fills_placeholders_in_order() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("en", "request.invalid_transition", &["Approved", "Pending"]),
            "Cannot change status from Approved to Pending."
        );
    }
}
