use crate::error::Error;
use crate::netlify::NetlifyError;

const NOT_FOUND: u16 = 404;

/// True when the error is a transport error carrying HTTP 404.
pub fn is_not_found(err: &Error) -> bool {
    err.transport().and_then(NetlifyError::code) == Some(NOT_FOUND)
}

/// Turns a 404 into `None`; every other error is passed through.
pub(crate) fn absent_on_not_found<T>(result: Result<T, NetlifyError>) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            let err = Error::from(err);
            if is_not_found(&err) {
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlify::ApiErrorBody;

    fn not_found() -> NetlifyError {
        NetlifyError::NotFound {
            path: "/accounts/a/env/K".to_string(),
        }
    }

    #[test]
    fn test_not_found_variant_is_detected() {
        assert!(is_not_found(&Error::from(not_found())));
    }

    #[test]
    fn test_api_404_is_detected() {
        let err = Error::from(NetlifyError::Api {
            status: 404,
            payload: Some(ApiErrorBody {
                code: Some(404),
                message: "Not Found".to_string(),
            }),
        });
        assert!(is_not_found(&err));
    }

    #[test]
    fn test_other_statuses_are_not_drift() {
        for status in [400, 401, 403, 422, 500] {
            let err = Error::from(NetlifyError::Api {
                status,
                payload: None,
            });
            assert!(!is_not_found(&err), "status {status} must not count as drift");
        }
    }

    #[test]
    fn test_non_transport_errors_are_not_drift() {
        let err = Error::MalformedId {
            id: "x".to_string(),
        };
        assert!(!is_not_found(&err));
    }

    #[test]
    fn test_absent_on_not_found() {
        assert_eq!(absent_on_not_found(Ok::<_, NetlifyError>(7)).unwrap(), Some(7));
        assert_eq!(absent_on_not_found::<u8>(Err(not_found())).unwrap(), None);

        let err = absent_on_not_found::<u8>(Err(NetlifyError::Api {
            status: 500,
            payload: None,
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Transport(NetlifyError::Api { status: 500, .. })));
    }
}
