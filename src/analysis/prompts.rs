//! Prompt templates for the two completion calls.

use super::types::Classification;

/// System message for the classification call.
pub const CLASSIFICATION_SYSTEM_PROMPT: &str =
    "Você é um especialista em análise de emails corporativos do setor financeiro.";

/// System message for the reply call.
pub const REPLY_SYSTEM_PROMPT: &str =
    "Você é um assistente de atendimento profissional de uma instituição financeira.";

/// Ask the model for exactly one label.
pub fn build_classification_prompt(email_text: &str) -> String {
    format!(
        "Você é um assistente de IA especializado em classificar emails do setor financeiro.\n\n\
         Analise o email abaixo e classifique-o em uma das seguintes categorias:\n\
         - PRODUTIVO: Emails que requerem uma ação ou resposta específica (solicitações de \
         suporte técnico, atualização sobre casos em aberto, dúvidas sobre o sistema, pedidos \
         de informação, reclamações, etc.)\n\
         - IMPRODUTIVO: Emails que não necessitam de uma ação imediata (mensagens de \
         felicitações, agradecimentos, mensagens de final de ano, etc.)\n\n\
         Email:\n\
         ---\n\
         {email_text}\n\
         ---\n\n\
         Responda APENAS com uma das palavras: PRODUTIVO ou IMPRODUTIVO"
    )
}

/// Ask the model for a reply suited to the label.
pub fn build_reply_prompt(email_text: &str, category: Classification) -> String {
    match category {
        Classification::Produtivo => format!(
            "Você é um assistente de atendimento de uma empresa financeira.\n\n\
             Com base no email abaixo, gere uma resposta profissional e cordial que:\n\
             1. Reconheça o recebimento da solicitação\n\
             2. Indique que o caso está sendo analisado\n\
             3. Forneça um prazo estimado de resposta (24-48 horas úteis)\n\
             4. Mantenha um tom formal mas acolhedor\n\n\
             Email recebido:\n\
             ---\n\
             {email_text}\n\
             ---\n\n\
             Escreva APENAS a resposta sugerida, sem explicações adicionais."
        ),
        Classification::Improdutivo => format!(
            "Você é um assistente de atendimento de uma empresa financeira.\n\n\
             Com base no email abaixo (que é uma mensagem de cortesia/agradecimento), gere uma \
             resposta breve, cordial e profissional.\n\n\
             Email recebido:\n\
             ---\n\
             {email_text}\n\
             ---\n\n\
             Escreva APENAS a resposta sugerida, sem explicações adicionais."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: &str = "Bom dia, meu boleto venceu e não consigo gerar a segunda via.";

    #[test]
    fn classification_prompt_delimits_email() {
        let prompt = build_classification_prompt(EMAIL);
        assert!(prompt.contains(&format!("---\n{EMAIL}\n---")));
        assert!(prompt.contains("PRODUTIVO ou IMPRODUTIVO"));
        assert!(prompt.contains("setor financeiro"));
    }

    #[test]
    fn produtivo_reply_mentions_response_window() {
        let prompt = build_reply_prompt(EMAIL, Classification::Produtivo);
        assert!(prompt.contains("24-48 horas úteis"));
        assert!(prompt.contains(EMAIL));
        assert!(prompt.contains("APENAS a resposta sugerida"));
    }

    #[test]
    fn improdutivo_reply_has_no_response_window() {
        let prompt = build_reply_prompt(EMAIL, Classification::Improdutivo);
        assert!(!prompt.contains("24-48"));
        assert!(prompt.contains("cortesia"));
        assert!(prompt.contains("APENAS a resposta sugerida"));
    }
}
