mod session;

pub use session::SshSession;

#[cfg(test)]
mod tests;
