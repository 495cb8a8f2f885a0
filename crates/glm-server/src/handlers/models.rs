//! Model listing handler.

use axum::{extract::State, Json};

use crate::{
    assembler::COMPLETION_OBJECT,
    models::{ModelCard, ModelList},
    state::AppState,
};

/// List embedding models, plus the chat model when it is loaded.
pub async fn handle_list_models(State(state): State<AppState>) -> Json<ModelList> {
    let mut cards: Vec<ModelCard> = state
        .encoders
        .model_ids()
        .iter()
        .map(|id| ModelCard::new(id.clone(), "embedding"))
        .collect();

    if state.chat_engine().is_ok() {
        cards.push(ModelCard::new(
            state.config.model_name.clone(),
            COMPLETION_OBJECT,
        ));
    }

    Json(ModelList::new(cards))
}
