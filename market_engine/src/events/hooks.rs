use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{ConversationOpenedEvent, EventHandler, EventProducer, Handler, MatchCreatedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub match_created_producer: Vec<EventProducer<MatchCreatedEvent>>,
    pub conversation_opened_producer: Vec<EventProducer<ConversationOpenedEvent>>,
}

pub struct EventHandlers {
    pub on_match_created: Option<EventHandler<MatchCreatedEvent>>,
    pub on_conversation_opened: Option<EventHandler<ConversationOpenedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_match_created = hooks.on_match_created.map(|f| EventHandler::new(buffer_size, f));
        let on_conversation_opened = hooks.on_conversation_opened.map(|f| EventHandler::new(buffer_size, f));
        Self { on_match_created, on_conversation_opened }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_match_created {
            result.match_created_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_conversation_opened {
            result.conversation_opened_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_match_created {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_conversation_opened {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_match_created: Option<Handler<MatchCreatedEvent>>,
    pub on_conversation_opened: Option<Handler<ConversationOpenedEvent>>,
}

impl EventHooks {
    pub fn on_match_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(MatchCreatedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_match_created = Some(Arc::new(f));
        self
    }

    pub fn on_conversation_opened<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ConversationOpenedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_conversation_opened = Some(Arc::new(f));
        self
    }
}
