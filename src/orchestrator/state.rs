//! Fallback state machine.
//!
//! Transitions are a pure function of the current state, the outcome of the last
//! attempt and the shape of the provider chain, so they can be tested without any
//! adapter.

use crate::error::ErrorClass;

/// Steps of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationState {
    Start,
    TryPrimaryProvider,
    TryProviderFallbackModel,
    TryAlternateProvider,
    Placeholder,
    Done,
}

/// What the state machine needs to know about a provider chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainShape {
    pub has_chain: bool,
    pub primary_has_fallback_model: bool,
    pub has_alternate: bool,
}

impl GenerationState {
    /// Whether this state invokes an adapter.
    pub const fn is_attempt(self) -> bool {
        matches!(
            self,
            Self::TryPrimaryProvider | Self::TryProviderFallbackModel | Self::TryAlternateProvider
        )
    }

    /// Next state. `failure` is the class of the failed attempt, `None` on success;
    /// it is ignored by states that do not invoke an adapter.
    pub fn next(self, failure: Option<ErrorClass>, shape: ChainShape) -> Self {
        let alternate_or_placeholder = if shape.has_alternate {
            Self::TryAlternateProvider
        } else {
            Self::Placeholder
        };

        match self {
            Self::Start if shape.has_chain => Self::TryPrimaryProvider,
            Self::Start => Self::Placeholder,
            Self::TryPrimaryProvider => match failure {
                None => Self::Done,
                // Credentials are missing or rejected; another model on the same
                // account would fail the same way.
                Some(ErrorClass::AuthFailure) => alternate_or_placeholder,
                Some(_) if shape.primary_has_fallback_model => Self::TryProviderFallbackModel,
                Some(_) => alternate_or_placeholder,
            },
            Self::TryProviderFallbackModel => match failure {
                None => Self::Done,
                Some(_) => alternate_or_placeholder,
            },
            Self::TryAlternateProvider => match failure {
                None => Self::Done,
                Some(_) => Self::Placeholder,
            },
            Self::Placeholder | Self::Done => Self::Done,
        }
    }
}

impl std::fmt::Display for GenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::TryPrimaryProvider => "try_primary_provider",
            Self::TryProviderFallbackModel => "try_provider_fallback_model",
            Self::TryAlternateProvider => "try_alternate_provider",
            Self::Placeholder => "placeholder",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::GenerationState::*;
    use super::*;

    const FULL: ChainShape = ChainShape {
        has_chain: true,
        primary_has_fallback_model: true,
        has_alternate: true,
    };
    const PRIMARY_ONLY: ChainShape = ChainShape {
        has_chain: true,
        primary_has_fallback_model: false,
        has_alternate: false,
    };

    #[test]
    fn start_goes_to_primary_or_placeholder() {
        assert_eq!(Start.next(None, FULL), TryPrimaryProvider);
        assert_eq!(Start.next(None, ChainShape::default()), Placeholder);
    }

    #[test]
    fn success_always_finishes() {
        for state in [TryPrimaryProvider, TryProviderFallbackModel, TryAlternateProvider] {
            assert_eq!(state.next(None, FULL), Done);
        }
    }

    #[test]
    fn transient_primary_failure_tries_fallback_model_first() {
        for class in [
            ErrorClass::Timeout,
            ErrorClass::TransportError,
            ErrorClass::MalformedResponse,
            ErrorClass::EmptyResult,
        ] {
            assert_eq!(TryPrimaryProvider.next(Some(class), FULL), TryProviderFallbackModel);
        }
    }

    #[test]
    fn auth_failure_skips_the_fallback_model() {
        assert_eq!(
            TryPrimaryProvider.next(Some(ErrorClass::AuthFailure), FULL),
            TryAlternateProvider
        );
        assert_eq!(
            TryPrimaryProvider.next(Some(ErrorClass::AuthFailure), PRIMARY_ONLY),
            Placeholder
        );
    }

    #[test]
    fn without_fallback_model_failures_go_to_alternate_or_placeholder() {
        let shape = ChainShape {
            primary_has_fallback_model: false,
            ..FULL
        };
        assert_eq!(
            TryPrimaryProvider.next(Some(ErrorClass::Timeout), shape),
            TryAlternateProvider
        );
        assert_eq!(
            TryPrimaryProvider.next(Some(ErrorClass::Timeout), PRIMARY_ONLY),
            Placeholder
        );
    }

    #[test]
    fn later_failures_converge_on_placeholder() {
        assert_eq!(
            TryProviderFallbackModel.next(Some(ErrorClass::EmptyResult), FULL),
            TryAlternateProvider
        );
        assert_eq!(
            TryProviderFallbackModel.next(Some(ErrorClass::EmptyResult), PRIMARY_ONLY),
            Placeholder
        );
        assert_eq!(
            TryAlternateProvider.next(Some(ErrorClass::AuthFailure), FULL),
            Placeholder
        );
        assert_eq!(Placeholder.next(None, FULL), Done);
    }

    #[test]
    fn every_path_terminates() {
        let classes = [None, Some(ErrorClass::AuthFailure), Some(ErrorClass::Timeout)];
        for shape in [FULL, PRIMARY_ONLY, ChainShape::default()] {
            for class in classes {
                let mut state = Start;
                let mut steps = 0;
                while state != Done {
                    state = state.next(class, shape);
                    steps += 1;
                    assert!(steps <= 6, "{shape:?} {class:?} did not terminate");
                }
            }
        }
    }
}
