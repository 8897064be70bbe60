#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Success,
    Warning,
    Error,
}

pub trait Notifier {
    fn ask(&mut self, question: &str) -> bool;
    fn notify(&mut self, level: Notice, message: &str);
}
