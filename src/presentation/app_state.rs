// Application state for HTTP handlers
use crate::application::view_service::ViewController;

#[derive(Clone)]
pub struct AppState {
    pub view_controller: ViewController,
}
