//! Welcome text and example prompts from the course modules

/// Guidance shown when a session has no messages yet
pub const WELCOME_TEXT: &str = "\
¡Hola! Tu Copiloto está listo.
Bienvenida/o al chat de práctica. Recordá los 3 pilares del curso:
  1. Pedir bien: usá contexto y detalles.
  2. Verificar: la IA puede \"alucinar\".
  3. Cuidarte: nunca compartas claves, DNI ni datos bancarios.";

/// Question that opens an empty chat
pub const WELCOME_QUESTION: &str = "¿Por dónde empezamos hoy?";

/// Quick suggestions shown under the welcome question
pub const WELCOME_SUGGESTIONS: &[ExamplePrompt] = &[
    ExamplePrompt {
        caption: "🎂 Creatividad",
        text: "Dame ideas originales para festejar un cumpleaños de 60...",
    },
    ExamplePrompt {
        caption: "📝 Resumen",
        text: "Te paso un texto largo y resumímelo en 3 puntos clave...",
    },
    ExamplePrompt {
        caption: "⚖️ Criterio",
        text: "¿Es verdad que el sol gira alrededor de la tierra? Verificalo.",
    },
];

/// A single example prompt
#[derive(Debug, Clone, Copy)]
pub struct ExamplePrompt {
    /// Short caption
    pub caption: &'static str,
    /// Prompt text the student can copy
    pub text: &'static str,
}

/// Example prompts grouped under one course module
#[derive(Debug, Clone, Copy)]
pub struct ExampleModule {
    /// Module title
    pub title: &'static str,
    /// One-line introduction
    pub intro: &'static str,
    /// Prompts for this module
    pub prompts: &'static [ExamplePrompt],
}

/// Example library, in course order
pub const EXAMPLE_PROMPTS: &[ExampleModule] = &[
    ExampleModule {
        title: "Módulo 2: Redacción",
        intro: "Probá la fórmula Contexto + Tarea + Detalle:",
        prompts: &[
            ExamplePrompt {
                caption: "Salud y Bienestar",
                text: "Actúa como un nutricionista experto (Contexto). Creame un menú semanal de cenas ligeras (Tarea) que incluyan verduras y sean fáciles de cocinar (Detalle).",
            },
            ExamplePrompt {
                caption: "Historia para nietos",
                text: "Soy abuela y quiero explicarle a mi nieto de 8 años qué fue la Revolución de Mayo. Explicámelo como si fuera un cuento breve y entretenido.",
            },
        ],
    },
    ExampleModule {
        title: "Módulo 3: Creatividad",
        intro: "Ideas frescas para jugar y crear:",
        prompts: &[
            ExamplePrompt {
                caption: "Decoración",
                text: "Tengo un living pequeño con poca luz. Dame 5 ideas de decoración estilo nórdico para que parezca más grande.",
            },
            ExamplePrompt {
                caption: "Juego Mental",
                text: "Vamos a jugar a 'Adivina el Personaje'. Vos pensá en un personaje histórico y yo te hago preguntas de 'Sí o No'.",
            },
        ],
    },
    ExampleModule {
        title: "Módulo 4: Seguridad",
        intro: "Detectando trampas y cuidando datos:",
        prompts: &[
            ExamplePrompt {
                caption: "Detectar Estafas",
                text: "Me llegó un mail diciendo que gané un iPhone y que pague el envío con mi tarjeta. ¿Qué señales debo mirar para saber si es una estafa?",
            },
            ExamplePrompt {
                caption: "Cuidar privacidad",
                text: "Quiero analizar mis gastos de tarjeta, pero no quiero darte mis datos reales. ¿Cómo puedo pasarte la información de forma segura?",
            },
        ],
    },
];
