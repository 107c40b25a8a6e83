//! Messages the server pushes while a client is monitoring.
//!
//! After a `monitor` request, the server sends a stream of callback messages
//! to the same socket without being asked.  Each one names a client-side
//! function to run: show an update, or stop monitoring.

use crate::codec::{CodecError, Decode, Encode, Integer, Opaque, Value};
use crate::record;

/// Which client-side action a callback asks for.
///
/// Defaults to id 0, the value a server leaves when it never sets one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallbackFunction {
    /// The server has ended the monitoring session (wire id 0).
    #[default]
    StopMonitoring,
    /// `Data` carries an account update to display (wire id 1).
    Update,
    /// An id this client does not know.  Kept so the listener can log it.
    Unknown(i64),
}

impl CallbackFunction {
    pub fn id(self) -> i64 {
        match self {
            CallbackFunction::StopMonitoring => 0,
            CallbackFunction::Update => 1,
            CallbackFunction::Unknown(id) => id,
        }
    }

    pub fn from_id(id: i64) -> Self {
        match id {
            0 => CallbackFunction::StopMonitoring,
            1 => CallbackFunction::Update,
            other => CallbackFunction::Unknown(other),
        }
    }
}

impl Encode for CallbackFunction {
    fn to_value(&self) -> Result<Value, CodecError> {
        Ok(Value::Int(Integer::from_signed(self.id())))
    }
}

impl Decode for CallbackFunction {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        let mut id = 0i64;
        id.decode_from(value)?;
        *self = CallbackFunction::from_id(id);
        Ok(())
    }
}

/// One server push.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallbackMessage {
    pub function: CallbackFunction,
    pub data: Opaque,
}

record!(CallbackMessage {
    function => "FunctionId",
    data => "Data",
});

impl CallbackMessage {
    /// An update carrying `payload`.
    ///
    /// # Errors
    ///
    /// Any [`CodecError`] raised while encoding `payload`.
    pub fn update<T: Encode + ?Sized>(payload: &T) -> Result<Self, CodecError> {
        Ok(Self {
            function: CallbackFunction::Update,
            data: Opaque::wrap(payload)?,
        })
    }

    /// The message that ends a monitoring session.
    pub fn stop() -> Self {
        Self {
            function: CallbackFunction::StopMonitoring,
            data: Opaque::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};

    #[test]
    fn test_known_ids_map_to_functions() {
        assert_eq!(CallbackFunction::from_id(0), CallbackFunction::StopMonitoring);
        assert_eq!(CallbackFunction::from_id(1), CallbackFunction::Update);
        assert_eq!(CallbackFunction::from_id(7), CallbackFunction::Unknown(7));
    }

    #[test]
    fn test_update_round_trip_with_two_phase_body() {
        // Arrange
        let message = CallbackMessage::update("balance changed").unwrap();

        // Act
        let bytes = encode(&message).unwrap();
        let mut back = CallbackMessage::default();
        decode(&bytes, &mut back).unwrap();
        let mut body = String::new();
        back.data.decode_into(&mut body).unwrap();

        // Assert
        assert_eq!(back.function, CallbackFunction::Update);
        assert_eq!(body, "balance changed");
    }

    #[test]
    fn test_unknown_function_id_survives_decoding() {
        let message = CallbackMessage {
            function: CallbackFunction::Unknown(42),
            data: Opaque::default(),
        };
        let bytes = encode(&message).unwrap();
        let mut back = CallbackMessage::default();
        decode(&bytes, &mut back).unwrap();
        assert_eq!(back.function, CallbackFunction::Unknown(42));
    }

    #[test]
    fn test_function_id_is_signed_on_the_wire() {
        assert_eq!(
            CallbackFunction::Update.to_value(),
            Ok(Value::Int(Integer::from_signed(1)))
        );
    }
}
